use anyhow::{bail, Context};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;

use super::types::{
    ActionConfig, ExceptionMappingConfig, InterceptorConfig, InterceptorRef,
    InterceptorStackConfig, Location, PackageConfig, Params, ResultConfig, ResultTypeConfig,
};

/// Serialization format of a configuration document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Yaml,
    Json,
    Toml,
}

impl ConfigFormat {
    /// Pick the format from a file extension.
    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("yaml" | "yml") => Ok(ConfigFormat::Yaml),
            Some("json") => Ok(ConfigFormat::Json),
            Some("toml") => Ok(ConfigFormat::Toml),
            other => bail!(
                "unsupported configuration extension {:?} for {}",
                other,
                path.display()
            ),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct ConfigDocument {
    #[serde(default)]
    packages: Vec<PackageDoc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct PackageDoc {
    name: String,
    #[serde(default)]
    namespace: String,
    #[serde(default, rename = "extends")]
    parent: Option<String>,
    #[serde(default, rename = "abstract")]
    is_abstract: bool,
    #[serde(default)]
    result_types: Vec<ResultTypeDoc>,
    #[serde(default)]
    interceptors: Vec<InterceptorDoc>,
    #[serde(default)]
    interceptor_stacks: Vec<StackDoc>,
    default_class_ref: Option<String>,
    default_action_ref: Option<String>,
    default_result_type: Option<String>,
    default_interceptor_ref: Option<String>,
    strict_method_invocation: Option<bool>,
    #[serde(default)]
    global_allowed_methods: Vec<String>,
    #[serde(default)]
    global_results: Vec<ResultDoc>,
    #[serde(default)]
    exception_mappings: Vec<ExceptionMappingDoc>,
    #[serde(default)]
    actions: Vec<ActionDoc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct ResultTypeDoc {
    name: String,
    class: String,
    #[serde(default)]
    params: BTreeMap<String, Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct InterceptorDoc {
    name: String,
    class: String,
    #[serde(default)]
    params: BTreeMap<String, Value>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum InterceptorRefDoc {
    Name(String),
    Full {
        name: String,
        #[serde(default)]
        params: BTreeMap<String, Value>,
    },
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct StackDoc {
    name: String,
    #[serde(default)]
    interceptor_refs: Vec<InterceptorRefDoc>,
}

fn default_result_name() -> String {
    "success".to_string()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct ResultDoc {
    #[serde(default = "default_result_name")]
    name: String,
    class: Option<String>,
    #[serde(rename = "type")]
    result_type: Option<String>,
    #[serde(default)]
    params: BTreeMap<String, Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct ExceptionMappingDoc {
    name: Option<String>,
    exception: String,
    result: String,
    #[serde(default)]
    params: BTreeMap<String, Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct ActionDoc {
    name: String,
    class: Option<String>,
    method: Option<String>,
    #[serde(default)]
    interceptor_refs: Vec<InterceptorRefDoc>,
    #[serde(default)]
    results: Vec<ResultDoc>,
    #[serde(default)]
    params: BTreeMap<String, Value>,
    #[serde(default)]
    allowed_methods: Vec<String>,
    #[serde(default)]
    exception_mappings: Vec<ExceptionMappingDoc>,
    method_regex: Option<String>,
}

/// Scalars become their plain text; anything else keeps its JSON rendering.
fn to_params(raw: BTreeMap<String, Value>) -> Params {
    raw.into_iter()
        .map(|(k, v)| {
            let text = match v {
                Value::String(s) => s,
                Value::Null => String::new(),
                other => other.to_string(),
            };
            (k, text)
        })
        .collect()
}

impl From<InterceptorRefDoc> for InterceptorRef {
    fn from(doc: InterceptorRefDoc) -> Self {
        match doc {
            InterceptorRefDoc::Name(name) => InterceptorRef::new(name),
            InterceptorRefDoc::Full { name, params } => InterceptorRef {
                name,
                params: to_params(params),
            },
        }
    }
}

impl From<ResultDoc> for ResultConfig {
    fn from(doc: ResultDoc) -> Self {
        ResultConfig {
            name: doc.name,
            class_name: doc.class,
            result_type: doc.result_type,
            params: to_params(doc.params),
        }
    }
}

impl From<ExceptionMappingDoc> for ExceptionMappingConfig {
    fn from(doc: ExceptionMappingDoc) -> Self {
        ExceptionMappingConfig {
            name: doc.name.unwrap_or_else(|| doc.exception.clone()),
            exception: doc.exception,
            result: doc.result,
            params: to_params(doc.params),
        }
    }
}

fn convert_action(doc: ActionDoc, location: Location) -> ActionConfig {
    let mut action = ActionConfig::new(doc.name).location(location);
    action.class_name = doc.class;
    action.method = doc.method;
    action.interceptor_refs = doc.interceptor_refs.into_iter().map(Into::into).collect();
    for result in doc.results {
        action = action.result(result.into());
    }
    action.params = to_params(doc.params);
    action.allowed_methods = doc.allowed_methods;
    action.exception_mappings = doc.exception_mappings.into_iter().map(Into::into).collect();
    action.method_regex = doc.method_regex;
    action
}

fn convert_package(doc: PackageDoc, source: &str, index: usize) -> PackageConfig {
    let package_location = format!("{source}#packages[{index}]");
    let mut pkg = PackageConfig::new(doc.name)
        .namespace(doc.namespace)
        .abstract_package(doc.is_abstract)
        .location(Location::new(package_location.clone()));
    pkg.parent = doc.parent;
    pkg.default_class_ref = doc.default_class_ref;
    pkg.default_action_ref = doc.default_action_ref;
    pkg.default_result_type = doc.default_result_type;
    pkg.default_interceptor_ref = doc.default_interceptor_ref;
    pkg.strict_method_invocation = doc.strict_method_invocation;
    pkg.global_allowed_methods = doc.global_allowed_methods;

    for rt in doc.result_types {
        pkg = pkg.result_type(ResultTypeConfig {
            name: rt.name,
            class_name: rt.class,
            params: to_params(rt.params),
        });
    }
    for i in doc.interceptors {
        pkg = pkg.interceptor(InterceptorConfig {
            name: i.name,
            class_name: i.class,
            params: to_params(i.params),
        });
    }
    for s in doc.interceptor_stacks {
        pkg = pkg.interceptor_stack(InterceptorStackConfig {
            name: s.name,
            refs: s.interceptor_refs.into_iter().map(Into::into).collect(),
        });
    }
    for r in doc.global_results {
        pkg = pkg.global_result(r.into());
    }
    pkg.exception_mappings = doc.exception_mappings.into_iter().map(Into::into).collect();
    for (j, a) in doc.actions.into_iter().enumerate() {
        let loc = Location::new(format!("{package_location}.actions[{j}]"));
        pkg = pkg.action(convert_action(a, loc));
    }
    pkg
}

/// Parse a configuration document. `source` names the origin in descriptor locations.
pub fn parse_packages(
    content: &str,
    format: ConfigFormat,
    source: &str,
) -> anyhow::Result<Vec<PackageConfig>> {
    let doc: ConfigDocument = match format {
        ConfigFormat::Yaml => serde_yaml::from_str(content)
            .with_context(|| format!("failed to parse YAML configuration {source}"))?,
        ConfigFormat::Json => serde_json::from_str(content)
            .with_context(|| format!("failed to parse JSON configuration {source}"))?,
        ConfigFormat::Toml => toml::from_str(content)
            .with_context(|| format!("failed to parse TOML configuration {source}"))?,
    };
    Ok(doc
        .packages
        .into_iter()
        .enumerate()
        .map(|(i, p)| convert_package(p, source, i))
        .collect())
}

/// Load package descriptors from a YAML, JSON or TOML file.
pub fn load_packages(path: impl AsRef<Path>) -> anyhow::Result<Vec<PackageConfig>> {
    let path = path.as_ref();
    let format = ConfigFormat::from_path(path)?;
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read configuration {}", path.display()))?;
    let packages = parse_packages(&content, format, &path.display().to_string())?;
    tracing::debug!(
        path = %path.display(),
        packages = packages.len(),
        "Loaded package descriptors"
    );
    Ok(packages)
}
