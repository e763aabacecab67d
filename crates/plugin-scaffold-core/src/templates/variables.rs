//! Template variables and their derived defaults

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Every variable a skeleton template may reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum VariableKey {
    GameName,
    GameExe,
    GamePath,
    ManagedPath,
    UnityVersion,
    Architecture,
    MainAssembly,
    BepInExVersion,
    Author,
    PluginName,
    PluginGuid,
    PluginVersion,
    Namespace,
    Description,
}

impl VariableKey {
    pub const ALL: [VariableKey; 14] = [
        VariableKey::GameName,
        VariableKey::GameExe,
        VariableKey::GamePath,
        VariableKey::ManagedPath,
        VariableKey::UnityVersion,
        VariableKey::Architecture,
        VariableKey::MainAssembly,
        VariableKey::BepInExVersion,
        VariableKey::Author,
        VariableKey::PluginName,
        VariableKey::PluginGuid,
        VariableKey::PluginVersion,
        VariableKey::Namespace,
        VariableKey::Description,
    ];

    /// Identifier used between the braces in templates
    pub fn as_str(&self) -> &'static str {
        match self {
            VariableKey::GameName => "GAME_NAME",
            VariableKey::GameExe => "GAME_EXE",
            VariableKey::GamePath => "GAME_PATH",
            VariableKey::ManagedPath => "MANAGED_PATH",
            VariableKey::UnityVersion => "UNITY_VERSION",
            VariableKey::Architecture => "ARCHITECTURE",
            VariableKey::MainAssembly => "MAIN_ASSEMBLY",
            VariableKey::BepInExVersion => "BEPINEX_VERSION",
            VariableKey::Author => "AUTHOR",
            VariableKey::PluginName => "PLUGIN_NAME",
            VariableKey::PluginGuid => "PLUGIN_GUID",
            VariableKey::PluginVersion => "PLUGIN_VERSION",
            VariableKey::Namespace => "NAMESPACE",
            VariableKey::Description => "DESCRIPTION",
        }
    }

    /// Prompt label shown in interactive mode
    pub fn label(&self) -> &'static str {
        match self {
            VariableKey::GameName => "Game name",
            VariableKey::GameExe => "Game executable",
            VariableKey::GamePath => "Game install directory",
            VariableKey::ManagedPath => "Managed assemblies directory",
            VariableKey::UnityVersion => "Unity version",
            VariableKey::Architecture => "Game architecture",
            VariableKey::MainAssembly => "Game assembly",
            VariableKey::BepInExVersion => "BepInEx version",
            VariableKey::Author => "Author",
            VariableKey::PluginName => "Plugin name",
            VariableKey::PluginGuid => "Plugin GUID",
            VariableKey::PluginVersion => "Plugin version",
            VariableKey::Namespace => "Root namespace",
            VariableKey::Description => "Plugin description",
        }
    }

    /// `{{KEY}}`
    pub fn placeholder(&self) -> String {
        format!("{{{{{}}}}}", self.as_str())
    }
}

impl fmt::Display for VariableKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for VariableKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        VariableKey::ALL
            .iter()
            .copied()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| format!("unknown template variable '{}'", s))
    }
}

/// Values collected for substitution.
///
/// Insertion consumes the map and returns the extended one, so each wizard
/// step hands a complete value to the next.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateVariables {
    values: BTreeMap<VariableKey, String>,
}

impl TemplateVariables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: VariableKey, value: impl Into<String>) -> Self {
        self.values.insert(key, value.into());
        self
    }

    /// Apply every entry of `other` on top of this map
    pub fn merged(mut self, other: &TemplateVariables) -> Self {
        for (key, value) in &other.values {
            self.values.insert(*key, value.clone());
        }
        self
    }

    pub fn get(&self, key: VariableKey) -> Option<&str> {
        self.values.get(&key).map(String::as_str)
    }

    /// Look up by template identifier (`GAME_NAME`)
    pub fn get_by_name(&self, name: &str) -> Option<&str> {
        name.parse::<VariableKey>().ok().and_then(|k| self.get(k))
    }

    pub fn contains(&self, key: VariableKey) -> bool {
        self.values.contains_key(&key)
    }

    /// Keys with no value yet
    pub fn missing(&self) -> Vec<VariableKey> {
        VariableKey::ALL
            .iter()
            .copied()
            .filter(|k| !self.contains(*k))
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (VariableKey, &str)> {
        self.values.iter().map(|(k, v)| (*k, v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Keep ASCII letters and digits, upper-casing the first letter of each word.
///
/// `"Risk of Rain 2"` -> `"RiskOfRain2"`. Leading digits get an underscore so
/// the result is a valid C# identifier.
pub fn to_identifier(text: &str) -> String {
    let mut out = String::new();
    for word in text.split(|c: char| !c.is_ascii_alphanumeric()) {
        let mut chars = word.chars();
        if let Some(first) = chars.next() {
            out.push(first.to_ascii_uppercase());
            out.extend(chars);
        }
    }
    if out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    out
}

/// Lower-case, dot-free segment for reverse-DNS GUIDs
fn guid_segment(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
        .collect::<String>()
        .to_ascii_lowercase()
}

/// Default plugin name for a game
pub fn default_plugin_name(game_name: &str) -> String {
    let ident = to_identifier(game_name);
    if ident.is_empty() {
        "MyPlugin".to_string()
    } else {
        format!("{}Plugin", ident)
    }
}

/// `com.{author}.{plugin}` in lower case
pub fn default_plugin_guid(author: &str, plugin_name: &str) -> String {
    let author = match guid_segment(author) {
        s if s.is_empty() => "author".to_string(),
        s => s,
    };
    let plugin = match guid_segment(plugin_name) {
        s if s.is_empty() => "plugin".to_string(),
        s => s,
    };
    format!("com.{}.{}", author, plugin)
}

/// Keys whose defaults follow from the author and game name
pub const AUTHOR_DERIVED: [VariableKey; 5] = [
    VariableKey::PluginName,
    VariableKey::PluginGuid,
    VariableKey::PluginVersion,
    VariableKey::Namespace,
    VariableKey::Description,
];

/// Default for a derived key given the values collected so far
pub fn derived_default(key: VariableKey, vars: &TemplateVariables) -> Option<String> {
    let game_name = vars.get(VariableKey::GameName).unwrap_or_default();
    let plugin_name = vars
        .get(VariableKey::PluginName)
        .map(str::to_string)
        .unwrap_or_else(|| default_plugin_name(game_name));

    match key {
        VariableKey::PluginName => Some(plugin_name),
        VariableKey::PluginGuid => Some(default_plugin_guid(
            vars.get(VariableKey::Author).unwrap_or_default(),
            &plugin_name,
        )),
        VariableKey::PluginVersion => Some("1.0.0".to_string()),
        VariableKey::Namespace => Some(to_identifier(&plugin_name)),
        VariableKey::Description => Some(format!("A BepInEx plugin for {}", game_name)),
        _ => None,
    }
}

/// Fill in author-derived values without overriding anything already set
pub fn derive_author_defaults(vars: TemplateVariables, author: &str) -> TemplateVariables {
    let mut derived = vars.with(VariableKey::Author, author.trim());
    for key in AUTHOR_DERIVED {
        if derived.contains(key) {
            continue;
        }
        if let Some(value) = derived_default(key, &derived) {
            derived = derived.with(key, value);
        }
    }
    derived
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_format() {
        assert_eq!(VariableKey::GameName.placeholder(), "{{GAME_NAME}}");
        assert_eq!(
            "BEPINEX_VERSION".parse::<VariableKey>(),
            Ok(VariableKey::BepInExVersion)
        );
        assert!("game_name".parse::<VariableKey>().is_err());
    }

    #[test]
    fn test_with_and_missing() {
        let vars = TemplateVariables::new()
            .with(VariableKey::GameName, "Valheim")
            .with(VariableKey::GameName, "Valheim 2");
        assert_eq!(vars.len(), 1);
        assert_eq!(vars.get_by_name("GAME_NAME"), Some("Valheim 2"));
        assert_eq!(vars.missing().len(), VariableKey::ALL.len() - 1);
        assert!(!vars.missing().contains(&VariableKey::GameName));
    }

    #[test]
    fn test_identifiers() {
        assert_eq!(to_identifier("Risk of Rain 2"), "RiskOfRain2");
        assert_eq!(to_identifier("7 Days to Die"), "_7DaysToDie");
        assert_eq!(to_identifier("valheim"), "Valheim");
        assert_eq!(default_plugin_name(""), "MyPlugin");
        assert_eq!(default_plugin_name("Valheim"), "ValheimPlugin");
    }

    #[test]
    fn test_guid() {
        assert_eq!(
            default_plugin_guid("Jane Doe", "ValheimPlugin"),
            "com.janedoe.valheimplugin"
        );
        assert_eq!(default_plugin_guid("", ""), "com.author.plugin");
    }

    #[test]
    fn test_derived_default_follows_plugin_name() {
        let vars = TemplateVariables::new()
            .with(VariableKey::Author, "jane")
            .with(VariableKey::PluginName, "Better Carts");
        assert_eq!(
            derived_default(VariableKey::PluginGuid, &vars).as_deref(),
            Some("com.jane.bettercarts")
        );
        assert_eq!(
            derived_default(VariableKey::Namespace, &vars).as_deref(),
            Some("BetterCarts")
        );
        assert_eq!(derived_default(VariableKey::GameName, &vars), None);
    }

    #[test]
    fn test_author_defaults_keep_existing_values() {
        let vars = TemplateVariables::new()
            .with(VariableKey::GameName, "Valheim")
            .with(VariableKey::PluginVersion, "0.3.0");

        let derived = derive_author_defaults(vars, " jane ");
        assert_eq!(derived.get(VariableKey::Author), Some("jane"));
        assert_eq!(derived.get(VariableKey::PluginName), Some("ValheimPlugin"));
        assert_eq!(
            derived.get(VariableKey::PluginGuid),
            Some("com.jane.valheimplugin")
        );
        assert_eq!(derived.get(VariableKey::PluginVersion), Some("0.3.0"));
        assert_eq!(derived.get(VariableKey::Namespace), Some("ValheimPlugin"));
    }
}
