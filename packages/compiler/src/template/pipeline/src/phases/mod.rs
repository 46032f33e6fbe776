//! Pipeline Phases
//!
//! Transformations run over a compilation job after ingestion. The order is not left to call-site
//! discipline: a `PhasePlan` only accepts phases whose prerequisites were scheduled before them.

pub mod binding_specialization;
pub mod create_i18n_contexts;
pub mod next_context_merging;
pub mod ng_container;
pub mod propagate_i18n_blocks;
pub mod resolve_dollar_event;
pub mod save_restore_view;
pub mod style_binding_specialization;
pub mod track_fn_optimization;
pub mod track_variables;
pub mod wrap_icus;

use std::collections::HashSet;

use tracing::debug;

use crate::error::{CompileError, Result};
use crate::template::pipeline::src::compilation::{CompilationJob, CompilationJobKind};

/// A single transformation of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    StyleBindingSpecialization,
    BindingSpecialization,
    PropagateI18nBlocks,
    WrapI18nIcus,
    CreateI18nContexts,
    SaveRestoreView,
    ResolveDollarEvent,
    TrackVariables,
    TrackFnOptimization,
    NextContextMerging,
    NgContainer,
}

const STANDARD_PHASES: [Phase; 11] = [
    Phase::StyleBindingSpecialization,
    Phase::BindingSpecialization,
    Phase::PropagateI18nBlocks,
    Phase::WrapI18nIcus,
    Phase::CreateI18nContexts,
    Phase::SaveRestoreView,
    Phase::ResolveDollarEvent,
    Phase::TrackVariables,
    Phase::TrackFnOptimization,
    Phase::NextContextMerging,
    Phase::NgContainer,
];

impl Phase {
    pub fn name(self) -> &'static str {
        match self {
            Phase::StyleBindingSpecialization => "specialize_style_bindings",
            Phase::BindingSpecialization => "specialize_bindings",
            Phase::PropagateI18nBlocks => "propagate_i18n_blocks",
            Phase::WrapI18nIcus => "wrap_i18n_icus",
            Phase::CreateI18nContexts => "create_i18n_contexts",
            Phase::SaveRestoreView => "save_and_restore_view",
            Phase::ResolveDollarEvent => "resolve_dollar_event",
            Phase::TrackVariables => "generate_track_variables",
            Phase::TrackFnOptimization => "optimize_track_fns",
            Phase::NextContextMerging => "merge_next_context_expressions",
            Phase::NgContainer => "generate_ng_container_ops",
        }
    }

    /// The kind of job this phase applies to.
    pub fn kind(self) -> CompilationJobKind {
        match self {
            Phase::StyleBindingSpecialization
            | Phase::BindingSpecialization
            | Phase::ResolveDollarEvent
            | Phase::NextContextMerging => CompilationJobKind::Both,
            Phase::PropagateI18nBlocks
            | Phase::WrapI18nIcus
            | Phase::CreateI18nContexts
            | Phase::SaveRestoreView
            | Phase::TrackVariables
            | Phase::TrackFnOptimization
            | Phase::NgContainer => CompilationJobKind::Tmpl,
        }
    }

    /// Phases that must have run before this one.
    pub fn prerequisites(self) -> &'static [Phase] {
        match self {
            Phase::BindingSpecialization => &[Phase::StyleBindingSpecialization],
            Phase::TrackFnOptimization => &[Phase::TrackVariables],
            Phase::WrapI18nIcus => &[Phase::PropagateI18nBlocks],
            Phase::CreateI18nContexts => &[Phase::PropagateI18nBlocks, Phase::WrapI18nIcus],
            Phase::StyleBindingSpecialization
            | Phase::PropagateI18nBlocks
            | Phase::SaveRestoreView
            | Phase::ResolveDollarEvent
            | Phase::TrackVariables
            | Phase::NextContextMerging
            | Phase::NgContainer => &[],
        }
    }

    pub fn applies_to(self, job_kind: CompilationJobKind) -> bool {
        self.kind().applies_to(job_kind)
    }

    pub fn run(self, job: &mut dyn CompilationJob) {
        match self {
            Phase::StyleBindingSpecialization => {
                style_binding_specialization::specialize_style_bindings(job)
            }
            Phase::BindingSpecialization => binding_specialization::specialize_bindings(job),
            Phase::PropagateI18nBlocks => propagate_i18n_blocks::propagate_i18n_blocks(job),
            Phase::WrapI18nIcus => wrap_icus::wrap_i18n_icus(job),
            Phase::CreateI18nContexts => create_i18n_contexts::create_i18n_contexts(job),
            Phase::SaveRestoreView => save_restore_view::save_and_restore_view(job),
            Phase::ResolveDollarEvent => resolve_dollar_event::resolve_dollar_event(job),
            Phase::TrackVariables => track_variables::generate_track_variables(job),
            Phase::TrackFnOptimization => track_fn_optimization::optimize_track_fns(job),
            Phase::NextContextMerging => next_context_merging::merge_next_context_expressions(job),
            Phase::NgContainer => ng_container::generate_ng_container_ops(job),
        }
    }
}

/// An ordered list of phases, validated against each phase's prerequisites.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhasePlan {
    phases: Vec<Phase>,
}

impl PhasePlan {
    pub fn new(phases: impl IntoIterator<Item = Phase>) -> Result<Self> {
        let phases: Vec<Phase> = phases.into_iter().collect();
        let mut scheduled = HashSet::new();
        for phase in &phases {
            if let Some(missing) = phase
                .prerequisites()
                .iter()
                .find(|prerequisite| !scheduled.contains(*prerequisite))
            {
                return Err(CompileError::PhaseOrder {
                    phase: phase.name(),
                    prerequisite: missing.name(),
                });
            }
            if !scheduled.insert(*phase) {
                return Err(CompileError::DuplicatePhase(phase.name()));
            }
        }
        Ok(PhasePlan { phases })
    }

    /// The full pipeline, in the order the phases depend on each other.
    pub fn standard() -> Self {
        PhasePlan {
            phases: STANDARD_PHASES.to_vec(),
        }
    }

    pub fn phases(&self) -> &[Phase] {
        &self.phases
    }

    /// Runs every phase that applies to the kind of `job`, in order.
    pub fn run(&self, job: &mut dyn CompilationJob) {
        let job_kind = job.kind();
        for phase in self.phases.iter().filter(|phase| phase.applies_to(job_kind)) {
            debug!(
                phase = phase.name(),
                component = job.component_name(),
                units = job.unit_xrefs().len(),
                "running phase"
            );
            phase.run(job);
        }
    }
}
