#![deny(clippy::all)]

//! Angular Template Pipeline
//!
//! Lowers a parsed Angular template (or a component's host bindings) into the template pipeline
//! IR and runs the transformation phases over it.

pub mod config;
pub mod core;
pub mod error;
pub mod expression_parser;
pub mod i18n;
pub mod ml_parser;
pub mod output;
pub mod parse_util;
pub mod render3;
pub mod schema;
pub mod template;

use anyhow::Context;

pub use config::CompilerOptions;
pub use error::{CompileError, Result};

use render3::r3_ast::R3Node;
use template::pipeline::src::phases::PhasePlan;
use template::pipeline::src::{
    ingest_component, ingest_host_binding, ComponentCompilationJob, HostBindingCompilationJob,
    HostBindingInput,
};

/// Ingests `template` and runs the standard phase plan over it.
pub fn compile_template(
    component_name: &str,
    template: &[R3Node],
    options: CompilerOptions,
) -> anyhow::Result<ComponentCompilationJob> {
    compile_template_with(component_name, template, options, &PhasePlan::standard())
}

/// Ingests `template` and runs `plan` over it.
pub fn compile_template_with(
    component_name: &str,
    template: &[R3Node],
    options: CompilerOptions,
    plan: &PhasePlan,
) -> anyhow::Result<ComponentCompilationJob> {
    let mut job = ingest_component(component_name, template, options)
        .with_context(|| format!("failed to ingest the template of {component_name}"))?;
    plan.run(&mut job);
    Ok(job)
}

/// Ingests the host bindings of a component and runs the standard phase plan over them.
pub fn compile_host_bindings(
    input: &HostBindingInput,
    options: CompilerOptions,
) -> anyhow::Result<HostBindingCompilationJob> {
    let mut job = ingest_host_binding(input, options).with_context(|| {
        format!(
            "failed to ingest the host bindings of {}",
            input.component_name
        )
    })?;
    PhasePlan::standard().run(&mut job);
    Ok(job)
}
