//! Extension registry.
//!
//! Modules plug their providers into named extension points. Multi-provider
//! points keep their providers sorted by descending priority, with providers
//! of equal priority in registration order.

use std::{fmt, rc::Rc};

use log::{debug, info};

use crate::{
    config::AppConfig,
    host::{
        event_bus::{EventBus, Subscription},
        factory::ElementFactory,
        ordering::GetOrdering,
        palette::PaletteProvider,
        render::Draw,
        rules::{Rules, Updater},
        styles::Styles,
        tools::{CreateTool, LassoTool, SpaceTool},
    },
};

/// Extension point names.
pub mod extension_point {
    pub const ELEMENT_FACTORY: &str = "elementFactory";
    pub const CUSTOM_RENDERER: &str = "customRenderer";
    pub const CUSTOM_ORDERING_PROVIDER: &str = "customOrderingProvider";
    pub const PALETTE_PROVIDER: &str = "paletteProvider";
    pub const CUSTOM_RULES: &str = "customRules";
    pub const CUSTOM_UPDATER: &str = "customUpdater";
    pub const CUSTOM_INTERACTION_LOGGER: &str = "customInteractionLogger";
}

/// Host services a module may depend on.
#[derive(Clone)]
pub struct Services {
    pub config: Rc<AppConfig>,
    pub event_bus: Rc<EventBus>,
    pub styles: Rc<Styles>,
    pub create_tool: Rc<CreateTool>,
    pub lasso_tool: Rc<LassoTool>,
    pub space_tool: Rc<SpaceTool>,
}

impl Services {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config: Rc::new(config),
            event_bus: EventBus::new(),
            styles: Rc::new(Styles::new()),
            create_tool: Rc::new(CreateTool::new()),
            lasso_tool: Rc::new(LassoTool::new()),
            space_tool: Rc::new(SpaceTool::new()),
        }
    }
}

impl fmt::Debug for Services {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Services")
            .field("event_bus", &self.event_bus)
            .finish_non_exhaustive()
    }
}

/// A set of providers registered together.
pub trait Module {
    fn name(&self) -> &'static str;

    /// Registers the module's providers.
    ///
    /// # Errors
    ///
    /// Returns a message when the module cannot be configured.
    fn register(&self, services: &Services, registry: &mut ExtensionRegistry) -> Result<(), String>;
}

/// A provider with its registration metadata.
pub struct Registered<T: ?Sized> {
    name: &'static str,
    priority: i32,
    service: Rc<T>,
}

impl<T: ?Sized> Registered<T> {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }

    pub fn service(&self) -> &Rc<T> {
        &self.service
    }
}

impl<T: ?Sized> Clone for Registered<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            priority: self.priority,
            service: Rc::clone(&self.service),
        }
    }
}

fn insert_by_priority<T: ?Sized>(
    list: &mut Vec<Registered<T>>,
    name: &'static str,
    priority: i32,
    service: Rc<T>,
) {
    let position = list
        .iter()
        .position(|entry| entry.priority < priority)
        .unwrap_or(list.len());
    list.insert(
        position,
        Registered {
            name,
            priority,
            service,
        },
    );
    debug!(extension_point = name, priority; "Provider registered");
}

/// Every provider the host consults.
#[derive(Default)]
pub struct ExtensionRegistry {
    element_factory: Option<Rc<dyn ElementFactory>>,
    renderers: Vec<Registered<dyn Draw>>,
    ordering_providers: Vec<Registered<dyn GetOrdering>>,
    palette_providers: Vec<Registered<dyn PaletteProvider>>,
    rules: Vec<Registered<dyn Rules>>,
    updaters: Vec<Registered<dyn Updater>>,
    subscriptions: Vec<Subscription>,
    modules: Vec<&'static str>,
}

impl ExtensionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers every provider of `module`.
    pub fn install(&mut self, module: &dyn Module, services: &Services) -> Result<(), String> {
        info!(module = module.name(); "Installing module");
        module.register(services, self)?;
        self.modules.push(module.name());
        Ok(())
    }

    /// Names of the installed modules in installation order.
    pub fn modules(&self) -> &[&'static str] {
        &self.modules
    }

    /// Sets the element factory; a later registration replaces an earlier one.
    pub fn set_element_factory(&mut self, factory: Rc<dyn ElementFactory>) {
        debug!(extension_point = extension_point::ELEMENT_FACTORY; "Element factory set");
        self.element_factory = Some(factory);
    }

    pub fn register_renderer(&mut self, name: &'static str, priority: i32, renderer: Rc<dyn Draw>) {
        insert_by_priority(&mut self.renderers, name, priority, renderer);
    }

    pub fn register_ordering_provider(
        &mut self,
        name: &'static str,
        priority: i32,
        provider: Rc<dyn GetOrdering>,
    ) {
        insert_by_priority(&mut self.ordering_providers, name, priority, provider);
    }

    pub fn register_palette_provider(
        &mut self,
        name: &'static str,
        priority: i32,
        provider: Rc<dyn PaletteProvider>,
    ) {
        insert_by_priority(&mut self.palette_providers, name, priority, provider);
    }

    pub fn register_rules(&mut self, name: &'static str, priority: i32, rules: Rc<dyn Rules>) {
        insert_by_priority(&mut self.rules, name, priority, rules);
    }

    pub fn register_updater(
        &mut self,
        name: &'static str,
        priority: i32,
        updater: Rc<dyn Updater>,
    ) {
        insert_by_priority(&mut self.updaters, name, priority, updater);
    }

    /// Keeps an event subscription alive for as long as the registry lives.
    pub fn keep_subscription(&mut self, subscription: Subscription) {
        self.subscriptions.push(subscription);
    }

    pub fn element_factory(&self) -> Option<&Rc<dyn ElementFactory>> {
        self.element_factory.as_ref()
    }

    pub fn renderers(&self) -> &[Registered<dyn Draw>] {
        &self.renderers
    }

    pub fn ordering_providers(&self) -> &[Registered<dyn GetOrdering>] {
        &self.ordering_providers
    }

    pub fn palette_providers(&self) -> &[Registered<dyn PaletteProvider>] {
        &self.palette_providers
    }

    pub fn rules(&self) -> &[Registered<dyn Rules>] {
        &self.rules
    }

    pub fn updaters(&self) -> &[Registered<dyn Updater>] {
        &self.updaters
    }

    /// Number of subscriptions held on behalf of modules.
    pub fn subscription_count(&self) -> usize {
        self.subscriptions.len()
    }
}

impl fmt::Debug for ExtensionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtensionRegistry")
            .field("modules", &self.modules.join(", "))
            .field("element_factory", &self.element_factory.is_some())
            .field("renderers", &self.renderers.len())
            .field("ordering_providers", &self.ordering_providers.len())
            .field("palette_providers", &self.palette_providers.len())
            .field("rules", &self.rules.len())
            .field("updaters", &self.updaters.len())
            .field("subscriptions", &self.subscriptions.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::render::DefaultRenderer;

    #[test]
    fn test_renderers_sorted_by_priority() {
        let styles = Rc::new(Styles::new());
        let mut registry = ExtensionRegistry::new();
        registry.register_renderer("low", 500, Rc::new(DefaultRenderer::new(Rc::clone(&styles))));
        registry.register_renderer("high", 2000, Rc::new(DefaultRenderer::new(Rc::clone(&styles))));
        registry.register_renderer("mid", 1000, Rc::new(DefaultRenderer::new(Rc::clone(&styles))));
        registry.register_renderer("mid-late", 1000, Rc::new(DefaultRenderer::new(styles)));

        let names: Vec<_> = registry.renderers().iter().map(|entry| entry.name()).collect();
        assert_eq!(names, vec!["high", "mid", "mid-late", "low"]);
    }

    #[test]
    fn test_install_records_module() {
        struct Empty;
        impl Module for Empty {
            fn name(&self) -> &'static str {
                "empty"
            }

            fn register(&self, _: &Services, _: &mut ExtensionRegistry) -> Result<(), String> {
                Ok(())
            }
        }

        let services = Services::new(AppConfig::default());
        let mut registry = ExtensionRegistry::new();
        registry.install(&Empty, &services).unwrap();
        assert_eq!(registry.modules(), &["empty"]);
    }

    #[test]
    fn test_kept_subscriptions_drop_with_registry() {
        use crate::host::event_bus::EventKind;

        let services = Services::new(AppConfig::default());
        let mut registry = ExtensionRegistry::new();
        registry.keep_subscription(services.event_bus.on(EventKind::ElementHover, 1000, |_| {}));
        assert_eq!(services.event_bus.listener_count(EventKind::ElementHover), 1);

        drop(registry);
        assert_eq!(services.event_bus.listener_count(EventKind::ElementHover), 0);
    }
}
