//! Compilation Module
//!
//! Compilation jobs and the per-view units they own.

use indexmap::IndexMap;

use crate::config::CompilerOptions;
use crate::output::output_ast::Expression;
use crate::template::pipeline::ir;
use crate::template::pipeline::ir::{CreateOp, ListId, OpList, UpdateOp, XrefId};

/// The kind of compilation job
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompilationJobKind {
    /// Template compilation
    Tmpl,
    /// Host binding compilation
    Host,
    /// A special value used to indicate that some logic applies to both compilation types
    Both,
}

impl CompilationJobKind {
    /// Whether a phase declared for `self` applies to a job of kind `job`.
    pub fn applies_to(self, job: CompilationJobKind) -> bool {
        self == CompilationJobKind::Both || self == job
    }
}

/// Monotonic source of xref ids and list ids for one job.
#[derive(Debug, Default)]
pub struct IdAllocator {
    next_xref: usize,
    next_list: usize,
}

impl IdAllocator {
    pub fn next_xref(&mut self) -> XrefId {
        let id = XrefId::new(self.next_xref);
        self.next_xref += 1;
        id
    }

    pub fn next_list(&mut self) -> ListId {
        let id = ListId::new(self.next_list);
        self.next_list += 1;
        id
    }
}

/// An entire ongoing compilation, which will result in one or more template functions when
/// complete. Contains one or more corresponding compilation units.
pub trait CompilationJob {
    fn kind(&self) -> CompilationJobKind;
    fn component_name(&self) -> &str;
    fn options(&self) -> &CompilerOptions;

    fn compatibility(&self) -> ir::CompatibilityMode {
        self.options().compatibility_mode
    }

    fn root_xref(&self) -> XrefId;

    /// Xrefs of every unit, root first, in creation order.
    fn unit_xrefs(&self) -> Vec<XrefId>;
    fn unit(&self, xref: XrefId) -> Option<&dyn CompilationUnit>;
    fn unit_mut(&mut self, xref: XrefId) -> Option<&mut dyn CompilationUnit>;

    /// Generate a new unique `XrefId` in this job.
    fn allocate_xref_id(&mut self) -> XrefId;
    fn allocate_list_id(&mut self) -> ListId;
}

/// A compilation unit is compiled into a template function. Some example units are views and
/// host bindings.
pub trait CompilationUnit {
    fn xref(&self) -> XrefId;

    /// The enclosing unit, for views embedded in another view.
    fn parent(&self) -> Option<XrefId> {
        None
    }

    fn create(&self) -> &OpList<CreateOp>;
    fn create_mut(&mut self) -> &mut OpList<CreateOp>;
    fn update(&self) -> &OpList<UpdateOp>;
    fn update_mut(&mut self) -> &mut OpList<UpdateOp>;
}

/// A template-local name whose value is computed from other context variables (`$first`, ...).
#[derive(Debug, Clone, PartialEq)]
pub struct AliasVariable {
    pub identifier: String,
    pub expression: Expression,
}

/// Compilation-in-progress of an individual view within a template.
#[derive(Debug)]
pub struct ViewCompilationUnit {
    pub xref: XrefId,
    pub parent: Option<XrefId>,
    pub create: OpList<CreateOp>,
    pub update: OpList<UpdateOp>,
    /// Map of declared variables available within this view to the property on the context
    /// object which they alias.
    pub context_variables: IndexMap<String, String>,
    /// Variables whose value is computed from the context rather than read from it.
    pub aliases: Vec<AliasVariable>,
}

impl ViewCompilationUnit {
    pub fn new(xref: XrefId, parent: Option<XrefId>, create: ListId, update: ListId) -> Self {
        ViewCompilationUnit {
            xref,
            parent,
            create: OpList::new(create),
            update: OpList::new(update),
            context_variables: IndexMap::new(),
            aliases: Vec::new(),
        }
    }
}

impl CompilationUnit for ViewCompilationUnit {
    fn xref(&self) -> XrefId {
        self.xref
    }

    fn parent(&self) -> Option<XrefId> {
        self.parent
    }

    fn create(&self) -> &OpList<CreateOp> {
        &self.create
    }

    fn create_mut(&mut self) -> &mut OpList<CreateOp> {
        &mut self.create
    }

    fn update(&self) -> &OpList<UpdateOp> {
        &self.update
    }

    fn update_mut(&mut self) -> &mut OpList<UpdateOp> {
        &mut self.update
    }
}

/// Compilation-in-progress of a whole component's template, including the main template and any
/// embedded views.
#[derive(Debug)]
pub struct ComponentCompilationJob {
    pub component_name: String,
    pub options: CompilerOptions,
    pub root: ViewCompilationUnit,
    /// Embedded views, in allocation order. The root view is kept separately.
    pub views: IndexMap<XrefId, ViewCompilationUnit>,
    ids: IdAllocator,
}

impl ComponentCompilationJob {
    pub fn new(component_name: impl Into<String>, options: CompilerOptions) -> Self {
        let mut ids = IdAllocator::default();
        let root_xref = ids.next_xref();
        let root = ViewCompilationUnit::new(root_xref, None, ids.next_list(), ids.next_list());
        ComponentCompilationJob {
            component_name: component_name.into(),
            options,
            root,
            views: IndexMap::new(),
            ids,
        }
    }

    /// Add a `ViewCompilationUnit` for a new embedded view to this compilation.
    pub fn allocate_view(&mut self, parent: XrefId) -> XrefId {
        let xref = self.ids.next_xref();
        let view = ViewCompilationUnit::new(
            xref,
            Some(parent),
            self.ids.next_list(),
            self.ids.next_list(),
        );
        self.views.insert(xref, view);
        xref
    }

    pub fn view(&self, xref: XrefId) -> &ViewCompilationUnit {
        if xref == self.root.xref {
            return &self.root;
        }
        match self.views.get(&xref) {
            Some(view) => view,
            None => panic!("AssertionError: no view with xref {xref}"),
        }
    }

    pub fn view_mut(&mut self, xref: XrefId) -> &mut ViewCompilationUnit {
        if xref == self.root.xref {
            return &mut self.root;
        }
        match self.views.get_mut(&xref) {
            Some(view) => view,
            None => panic!("AssertionError: no view with xref {xref}"),
        }
    }

    /// Every view, root first.
    pub fn all_views(&self) -> impl Iterator<Item = &ViewCompilationUnit> {
        std::iter::once(&self.root).chain(self.views.values())
    }
}

impl CompilationJob for ComponentCompilationJob {
    fn kind(&self) -> CompilationJobKind {
        CompilationJobKind::Tmpl
    }

    fn component_name(&self) -> &str {
        &self.component_name
    }

    fn options(&self) -> &CompilerOptions {
        &self.options
    }

    fn root_xref(&self) -> XrefId {
        self.root.xref
    }

    fn unit_xrefs(&self) -> Vec<XrefId> {
        self.all_views().map(|view| view.xref).collect()
    }

    fn unit(&self, xref: XrefId) -> Option<&dyn CompilationUnit> {
        if xref == self.root.xref {
            return Some(&self.root);
        }
        self.views
            .get(&xref)
            .map(|view| view as &dyn CompilationUnit)
    }

    fn unit_mut(&mut self, xref: XrefId) -> Option<&mut dyn CompilationUnit> {
        if xref == self.root.xref {
            return Some(&mut self.root);
        }
        self.views
            .get_mut(&xref)
            .map(|view| view as &mut dyn CompilationUnit)
    }

    fn allocate_xref_id(&mut self) -> XrefId {
        self.ids.next_xref()
    }

    fn allocate_list_id(&mut self) -> ListId {
        self.ids.next_list()
    }
}

/// Compilation-in-progress of a component's host bindings.
#[derive(Debug)]
pub struct HostBindingCompilationJob {
    pub component_name: String,
    pub options: CompilerOptions,
    pub root: HostBindingCompilationUnit,
    ids: IdAllocator,
}

impl HostBindingCompilationJob {
    pub fn new(component_name: impl Into<String>, options: CompilerOptions) -> Self {
        let mut ids = IdAllocator::default();
        let xref = ids.next_xref();
        let root = HostBindingCompilationUnit::new(xref, ids.next_list(), ids.next_list());
        HostBindingCompilationJob {
            component_name: component_name.into(),
            options,
            root,
            ids,
        }
    }
}

impl CompilationJob for HostBindingCompilationJob {
    fn kind(&self) -> CompilationJobKind {
        CompilationJobKind::Host
    }

    fn component_name(&self) -> &str {
        &self.component_name
    }

    fn options(&self) -> &CompilerOptions {
        &self.options
    }

    fn root_xref(&self) -> XrefId {
        self.root.xref
    }

    fn unit_xrefs(&self) -> Vec<XrefId> {
        vec![self.root.xref]
    }

    fn unit(&self, xref: XrefId) -> Option<&dyn CompilationUnit> {
        (xref == self.root.xref).then_some(&self.root as &dyn CompilationUnit)
    }

    fn unit_mut(&mut self, xref: XrefId) -> Option<&mut dyn CompilationUnit> {
        if xref == self.root.xref {
            Some(&mut self.root)
        } else {
            None
        }
    }

    fn allocate_xref_id(&mut self) -> XrefId {
        self.ids.next_xref()
    }

    fn allocate_list_id(&mut self) -> ListId {
        self.ids.next_list()
    }
}

/// The single unit of a host binding job.
#[derive(Debug)]
pub struct HostBindingCompilationUnit {
    pub xref: XrefId,
    pub create: OpList<CreateOp>,
    pub update: OpList<UpdateOp>,
}

impl HostBindingCompilationUnit {
    pub fn new(xref: XrefId, create: ListId, update: ListId) -> Self {
        HostBindingCompilationUnit {
            xref,
            create: OpList::new(create),
            update: OpList::new(update),
        }
    }
}

impl CompilationUnit for HostBindingCompilationUnit {
    fn xref(&self) -> XrefId {
        self.xref
    }

    fn create(&self) -> &OpList<CreateOp> {
        &self.create
    }

    fn create_mut(&mut self) -> &mut OpList<CreateOp> {
        &mut self.create
    }

    fn update(&self) -> &OpList<UpdateOp> {
        &self.update
    }

    fn update_mut(&mut self) -> &mut OpList<UpdateOp> {
        &mut self.update
    }
}
