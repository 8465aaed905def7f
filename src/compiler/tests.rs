use std::sync::Arc;

use super::*;
use crate::config::{
    ActionConfig, ExceptionMappingConfig, InterceptorConfig, InterceptorStackConfig,
    PackageConfig, PackageSet, ResultConfig, ResultTypeConfig,
};
use crate::error::{ConfigError, CycleKind};
use crate::resolver::{resolve_package_defaults, PackageDefaults};

fn defaults(packages: Vec<PackageConfig>, name: &str) -> PackageDefaults {
    let set: PackageSet = packages
        .into_iter()
        .map(|p| (p.name.clone(), Arc::new(p)))
        .collect();
    resolve_package_defaults(&set[name], &set).unwrap()
}

fn base() -> PackageConfig {
    PackageConfig::new("base")
        .abstract_package(true)
        .result_type(ResultTypeConfig::new("dispatcher", "DispatcherResult").param("parse", "true"))
        .result_type(ResultTypeConfig::new("json", "JsonResult"))
        .default_result_type("dispatcher")
        .interceptor(InterceptorConfig::new("timer", "TimerInterceptor"))
        .interceptor(InterceptorConfig::new("params", "ParamsInterceptor"))
        .interceptor_stack(
            InterceptorStackConfig::new("defaultStack")
                .with_ref("timer")
                .with_ref("params"),
        )
        .default_interceptor_ref("defaultStack")
        .global_result(ResultConfig::new("error").param("location", "/error.jsp"))
}

fn compiler() -> ActionCompiler {
    ActionCompiler::new(&CompileSettings::default())
}

#[test]
fn test_results_take_default_type() {
    let d = defaults(vec![base(), PackageConfig::new("app").parent("base")], "app");
    let action = ActionConfig::new("view")
        .result(ResultConfig::new("success").param("location", "/view.jsp"));
    let compiled = compiler().compile(&action, &d).unwrap();

    let success = compiled.result("success").unwrap();
    assert_eq!(success.class_name, "DispatcherResult");
    assert_eq!(success.params["location"], "/view.jsp");
    assert_eq!(success.params["parse"], "true");
    // global result inherited from base
    assert_eq!(compiled.result("error").unwrap().class_name, "DispatcherResult");
}

#[test]
fn test_child_default_result_type_overrides() {
    let d = defaults(
        vec![
            base(),
            PackageConfig::new("api")
                .parent("base")
                .default_result_type("json"),
        ],
        "api",
    );
    let action = ActionConfig::new("list").result(ResultConfig::new("success"));
    let compiled = compiler().compile(&action, &d).unwrap();
    assert_eq!(compiled.result("success").unwrap().class_name, "JsonResult");
}

#[test]
fn test_action_result_overrides_global() {
    let d = defaults(vec![base()], "base");
    let action = ActionConfig::new("save")
        .result(ResultConfig::new("error").class("CustomError"));
    let compiled = compiler().compile(&action, &d).unwrap();
    assert_eq!(compiled.result("error").unwrap().class_name, "CustomError");
    assert!(compiled.result("error").unwrap().params.is_empty());
}

#[test]
fn test_result_without_default_type_is_unresolved() {
    let d = defaults(vec![PackageConfig::new("bare")], "bare");
    let action = ActionConfig::new("a").result(ResultConfig::new("success"));
    let err = compiler().compile(&action, &d).unwrap_err();
    assert!(matches!(
        err,
        ConfigError::UnresolvedDefault { ref result, .. } if result == "success"
    ));
}

#[test]
fn test_unknown_result_type_is_unresolved() {
    let d = defaults(vec![base()], "base");
    let action = ActionConfig::new("a").result(ResultConfig::new("success").of_type("stream"));
    let err = compiler().compile(&action, &d).unwrap_err();
    assert_eq!(err.kind(), "unresolved_default");
    assert!(err.to_string().contains("stream"));
}

#[test]
fn test_default_interceptor_ref_used_when_action_has_none() {
    let d = defaults(vec![base()], "base");
    let compiled = compiler().compile(&ActionConfig::new("a"), &d).unwrap();
    let names: Vec<_> = compiled.interceptors.iter().map(|i| i.name.as_str()).collect();
    assert_eq!(names, vec!["timer", "params"]);

    let own = ActionConfig::new("b").interceptor_ref("params");
    let compiled = compiler().compile(&own, &d).unwrap();
    assert_eq!(compiled.interceptors.len(), 1);
    assert_eq!(compiled.interceptors[0].class_name, "ParamsInterceptor");
}

#[test]
fn test_interceptor_cycle_fails_action() {
    let d = defaults(
        vec![base()
            .interceptor_stack(InterceptorStackConfig::new("loopA").with_ref("loopB"))
            .interceptor_stack(InterceptorStackConfig::new("loopB").with_ref("loopA"))],
        "base",
    );
    let err = compiler()
        .compile(&ActionConfig::new("a").interceptor_ref("loopA"), &d)
        .unwrap_err();
    assert!(matches!(
        err,
        ConfigError::CyclicInheritance { kind: CycleKind::InterceptorStack, .. }
    ));
}

#[test]
fn test_class_name_falls_back_to_package_default() {
    let d = defaults(vec![base().default_class_ref("ActionSupport")], "base");
    let compiled = compiler().compile(&ActionConfig::new("a"), &d).unwrap();
    assert_eq!(compiled.class_name.as_deref(), Some("ActionSupport"));
    assert_eq!(compiled.method_name(), "execute");

    let own = compiler()
        .compile(&ActionConfig::new("b").class("Own"), &d)
        .unwrap();
    assert_eq!(own.class_name.as_deref(), Some("Own"));
}

#[test]
fn test_method_regex_selection() {
    let d = defaults(vec![base().strict_method_invocation(false)], "base");

    let default = compiler().compile(&ActionConfig::new("a"), &d).unwrap();
    assert_eq!(default.method_regex(), DEFAULT_METHOD_REGEX);
    assert!(default.is_allowed_method("save$1"));
    assert!(!default.is_allowed_method("save-now"));

    let system = ActionCompiler::new(&CompileSettings {
        method_regex: Some("[a-z]+".to_string()),
    });
    let compiled = system.compile(&ActionConfig::new("a"), &d).unwrap();
    assert!(compiled.is_allowed_method("save"));
    assert!(!compiled.is_allowed_method("Save"));

    let own = system
        .compile(&ActionConfig::new("a").method_regex("list|view"), &d)
        .unwrap();
    assert!(own.is_allowed_method("view"));
    assert!(!own.is_allowed_method("listing"));
}

#[test]
fn test_invalid_method_regex() {
    let d = defaults(vec![base()], "base");
    let err = compiler()
        .compile(&ActionConfig::new("a").method_regex("(unclosed"), &d)
        .unwrap_err();
    assert_eq!(err.kind(), "invalid_pattern");

    let broken = ActionCompiler::new(&CompileSettings {
        method_regex: Some("[".to_string()),
    });
    assert!(broken.compile(&ActionConfig::new("a"), &d).is_err());
}

#[test]
fn test_strict_method_invocation_uses_allowed_methods() {
    let d = defaults(vec![base().global_allowed_method("list")], "base");
    let compiled = compiler()
        .compile(
            &ActionConfig::new("a")
                .method("view")
                .allowed_method("edit*"),
            &d,
        )
        .unwrap();
    assert!(compiled.strict_method_invocation);
    assert!(compiled.is_allowed_method("view"));
    assert!(compiled.is_allowed_method("list"));
    assert!(compiled.is_allowed_method("editProfile"));
    assert!(!compiled.is_allowed_method("delete"));
    assert_eq!(compiled.allowed_methods.declared(), ["list", "edit*"]);
}

#[test]
fn test_exception_mappings_action_first() {
    let d = defaults(
        vec![base().exception_mapping(ExceptionMappingConfig::new("io", "IoError", "error"))],
        "base",
    );
    let compiled = compiler()
        .compile(
            &ActionConfig::new("a")
                .exception_mapping(ExceptionMappingConfig::new("io-local", "IoError", "retry")),
            &d,
        )
        .unwrap();
    assert_eq!(compiled.exception_mappings.len(), 2);
    assert_eq!(compiled.exception_mappings[0].name, "io");
    assert_eq!(
        compiled.find_exception_mapping("IoError").unwrap().result,
        "retry"
    );
    assert!(compiled.find_exception_mapping("Other").is_none());
}

#[test]
fn test_substitution_leaves_original_untouched() {
    let d = defaults(vec![base()], "base");
    let compiled = compiler()
        .compile(
            &ActionConfig::new("edit_*")
                .class("{1}Action")
                .method("edit{1}")
                .param("target", "{1}")
                .allowed_method("{1}*")
                .result(ResultConfig::new("success").param("location", "/{1}.jsp")),
            &d,
        )
        .unwrap();
    let caps = vec!["edit_profile".to_string(), "profile".to_string()];
    let concrete = compiled.substituted(&caps);

    assert_eq!(concrete.class_name.as_deref(), Some("profileAction"));
    assert_eq!(concrete.method_name(), "editprofile");
    assert_eq!(concrete.params["target"], "profile");
    assert_eq!(concrete.result("success").unwrap().params["location"], "/profile.jsp");
    assert!(concrete.is_allowed_method("profileView"));

    assert_eq!(compiled.class_name.as_deref(), Some("{1}Action"));
    assert_eq!(compiled.params["target"], "{1}");
}

#[test]
fn test_compilation_is_deterministic() {
    let d = defaults(vec![base()], "base");
    let action = ActionConfig::new("a").result(ResultConfig::new("success"));
    let c = compiler();
    assert_eq!(c.compile(&action, &d).unwrap(), c.compile(&action, &d).unwrap());
}
