use anyhow::{anyhow, Result};
use fluent_bundle::concurrent::FluentBundle;
use fluent_bundle::{FluentArgs, FluentResource, FluentValue};
use std::collections::HashMap;
use std::sync::LazyLock;
use unic_langid::LanguageIdentifier;

const DEFAULT_LANGUAGE: &str = "en";
const EN_RESOURCE: &str = include_str!("../locales/en/main.ftl");

/// Localization manager for the roster bot
pub struct LocalizationManager {
    bundles: HashMap<String, FluentBundle<FluentResource>>,
}

impl LocalizationManager {
    /// Create a new localization manager
    pub fn new() -> Result<Self> {
        let mut bundles = HashMap::new();

        let en_locale: LanguageIdentifier = DEFAULT_LANGUAGE.parse()?;
        let bundle = Self::create_bundle(&en_locale, EN_RESOURCE)?;
        bundles.insert(DEFAULT_LANGUAGE.to_string(), bundle);

        Ok(Self { bundles })
    }

    /// Create a fluent bundle for a specific locale from embedded source
    fn create_bundle(
        locale: &LanguageIdentifier,
        source: &str,
    ) -> Result<FluentBundle<FluentResource>> {
        let mut bundle = FluentBundle::new_concurrent(vec![locale.clone()]);
        // Replies are compared verbatim; no bidi isolation marks around arguments
        bundle.set_use_isolating(false);

        let resource = FluentResource::try_new(source.to_string())
            .map_err(|(_, errors)| anyhow!("Invalid Fluent resource for {locale}: {errors:?}"))?;
        bundle
            .add_resource(resource)
            .map_err(|errors| anyhow!("Duplicate Fluent messages for {locale}: {errors:?}"))?;

        Ok(bundle)
    }

    /// Get a localized message
    pub fn get_message(&self, key: &str, args: Option<&FluentArgs>) -> String {
        let Some(bundle) = self.bundles.get(DEFAULT_LANGUAGE) else {
            return format!("Missing translation: {key}");
        };

        let msg = match bundle.get_message(key) {
            Some(msg) => msg,
            None => return format!("Missing translation: {key}"),
        };

        let pattern = match msg.value() {
            Some(pattern) => pattern,
            None => return format!("Missing value for key: {key}"),
        };

        let mut errors = vec![];
        bundle.format_pattern(pattern, args, &mut errors).into_owned()
    }

    /// Get a localized message with simple string arguments
    pub fn get_message_with_args(&self, key: &str, args: &[(&str, &str)]) -> String {
        let mut fluent_args = FluentArgs::new();
        for (name, value) in args {
            fluent_args.set(*name, FluentValue::from(*value));
        }
        self.get_message(key, Some(&fluent_args))
    }
}

static LOCALIZATION_MANAGER: LazyLock<Option<LocalizationManager>> =
    LazyLock::new(|| match LocalizationManager::new() {
        Ok(manager) => Some(manager),
        Err(e) => {
            tracing::error!(error = %e, "Failed to load localization resources");
            None
        }
    });

/// Load the embedded resources eagerly so a broken bundle shows up at startup
pub fn init_localization() -> Result<()> {
    LOCALIZATION_MANAGER
        .as_ref()
        .map(|_| ())
        .ok_or_else(|| anyhow!("Localization resources failed to load"))
}

/// Convenience function to get a localized message
pub fn t(key: &str) -> String {
    match LOCALIZATION_MANAGER.as_ref() {
        Some(manager) => manager.get_message(key, None),
        None => format!("Missing translation: {key}"),
    }
}

/// Convenience function to get a localized message with arguments
pub fn t_args(key: &str, args: &[(&str, &str)]) -> String {
    match LOCALIZATION_MANAGER.as_ref() {
        Some(manager) => manager.get_message_with_args(key, args),
        None => format!("Missing translation: {key}"),
    }
}
