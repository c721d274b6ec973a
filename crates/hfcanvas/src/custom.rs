//! The custom workflow module.
//!
//! [`CustomModule`] registers the providers that teach the host about the
//! `hf` vocabulary: the element factory, the renderer, the ordering
//! provider, the palette, the rules, the updater and the interaction logger.

pub mod factory;
pub mod logger;
pub mod ordering;
pub mod palette;
pub mod renderer;
pub mod rules;
pub mod style;

use std::rc::Rc;

use log::debug;

use crate::host::{
    factory::ElementFactory,
    registry::{ExtensionRegistry, Module, Services, extension_point},
    render::{DEFAULT_RENDER_PRIORITY, DefaultRenderer},
    tools::{PlacementTool, ToolActivation},
};

use factory::CustomElementFactory;
use logger::CustomInteractionLogger;
use ordering::{CUSTOM_ORDERING_PRIORITY, CustomOrderingProvider};
use palette::{CUSTOM_PALETTE_PRIORITY, CustomPaletteProvider};
use renderer::{CUSTOM_RENDER_PRIORITY, CustomRenderer};
use rules::{CUSTOM_RULES_PRIORITY, CustomRules, CustomUpdater};
use style::StyleTable;

/// Registers every custom provider.
#[derive(Debug, Clone, Copy, Default)]
pub struct CustomModule;

impl CustomModule {
    pub fn new() -> Self {
        Self
    }
}

impl Module for CustomModule {
    fn name(&self) -> &'static str {
        "custom"
    }

    fn register(
        &self,
        services: &Services,
        registry: &mut ExtensionRegistry,
    ) -> Result<(), String> {
        let table = Rc::new(StyleTable::new(services.config.style())?);

        let factory: Rc<dyn ElementFactory> = Rc::new(CustomElementFactory::new());
        registry.set_element_factory(Rc::clone(&factory));

        registry.register_renderer(
            extension_point::CUSTOM_RENDERER,
            CUSTOM_RENDER_PRIORITY,
            Rc::new(CustomRenderer::new(Rc::clone(&services.styles), table)),
        );
        registry.register_renderer(
            "defaultRenderer",
            DEFAULT_RENDER_PRIORITY,
            Rc::new(DefaultRenderer::new(Rc::clone(&services.styles))),
        );

        registry.register_ordering_provider(
            extension_point::CUSTOM_ORDERING_PROVIDER,
            CUSTOM_ORDERING_PRIORITY,
            Rc::new(CustomOrderingProvider::new()),
        );

        registry.register_palette_provider(
            extension_point::PALETTE_PROVIDER,
            CUSTOM_PALETTE_PRIORITY,
            Rc::new(CustomPaletteProvider::new(
                factory,
                Rc::clone(&services.create_tool) as Rc<dyn PlacementTool>,
                Rc::clone(&services.lasso_tool) as Rc<dyn ToolActivation>,
                Rc::clone(&services.space_tool) as Rc<dyn ToolActivation>,
            )),
        );

        registry.register_rules(
            extension_point::CUSTOM_RULES,
            CUSTOM_RULES_PRIORITY,
            Rc::new(CustomRules::new()),
        );
        registry.register_updater(
            extension_point::CUSTOM_UPDATER,
            CUSTOM_RULES_PRIORITY,
            Rc::new(CustomUpdater::new()),
        );

        registry.keep_subscription(CustomInteractionLogger::new().attach(&services.event_bus));
        debug!(
            extension_point = extension_point::CUSTOM_INTERACTION_LOGGER;
            "Interaction logger attached"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::AppConfig, host::event_bus::EventKind};

    #[test]
    fn test_register_wires_every_extension_point() {
        let services = Services::new(AppConfig::default());
        let mut registry = ExtensionRegistry::new();
        registry.install(&CustomModule::new(), &services).unwrap();

        assert!(registry.element_factory().is_some());
        let renderers: Vec<_> = registry.renderers().iter().map(|entry| entry.name()).collect();
        assert_eq!(renderers, vec!["customRenderer", "defaultRenderer"]);
        assert_eq!(registry.ordering_providers().len(), 1);
        assert_eq!(registry.palette_providers().len(), 1);
        assert_eq!(registry.rules().len(), 1);
        assert_eq!(registry.updaters().len(), 1);
        assert_eq!(services.event_bus.listener_count(EventKind::ElementHover), 1);

        drop(registry);
        assert_eq!(services.event_bus.listener_count(EventKind::ElementHover), 0);
    }

    #[test]
    fn test_invalid_colour_fails_registration() {
        let config: AppConfig = toml::from_str("[style]\nbadge_fill = \"not a colour\"").unwrap();
        let services = Services::new(config);
        let mut registry = ExtensionRegistry::new();
        assert!(registry.install(&CustomModule::new(), &services).is_err());
        assert!(registry.modules().is_empty());
    }
}
