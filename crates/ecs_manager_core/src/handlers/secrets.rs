use regex::Regex;
use serde_json::{json, Value};

use crate::api::{DescribeParametersParams, ListTagsForResourceParams, TaggedResourceType};
use crate::fault::{Fault, FaultKind};
use crate::handlers::{call, reject, HandlerContext, Step};

/// Compiles name patterns that must match a whole parameter name.
pub fn compile_patterns(patterns: &[String]) -> Result<Vec<Regex>, Fault> {
    patterns
        .iter()
        .map(|pattern| {
            Regex::new(&format!("^(?:{pattern})$")).map_err(|error| {
                Fault::new(
                    FaultKind::InvalidPattern,
                    "InvalidPattern",
                    format!("'{pattern}' is not a valid regular expression: {error}"),
                )
            })
        })
        .collect()
}

/// Builds the container `secrets` list from stored parameters.
///
/// Pages through every stored parameter, keeps those whose name matches any
/// pattern, and maps each one carrying the environment-variable tag to
/// `{"name": <tag value>, "valueFrom": <parameter name>}`. Parameters without
/// the tag are dropped.
pub fn map_secrets(ctx: &HandlerContext<'_>, patterns: &[String]) -> Step<Vec<Value>> {
    let logger = ctx.logger;
    let engines = compile_patterns(patterns).map_err(|fault| reject(logger, fault))?;

    let mut matching_names = Vec::new();
    let mut params = DescribeParametersParams::default();
    loop {
        let page = call(logger, "describe_parameters", || {
            ctx.ssm.describe_parameters(&params)
        })?;
        let names = page
            .get("Parameters")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .filter_map(|parameter| parameter.get("Name").and_then(Value::as_str))
            .filter(|name| engines.iter().any(|engine| engine.is_match(name)))
            .map(str::to_string);
        matching_names.extend(names);

        match page.get("NextToken").and_then(Value::as_str) {
            Some(token) if !token.is_empty() => params.next_token = Some(token.to_string()),
            _ => break,
        }
    }

    let mut secrets = Vec::new();
    for name in matching_names {
        let tag_params = ListTagsForResourceParams {
            resource_type: TaggedResourceType::Parameter,
            resource_id: name.clone(),
        };
        let tags = call(logger, "list_tags_for_resource", || {
            ctx.ssm.list_tags_for_resource(&tag_params)
        })?;
        let env_var_name = tags
            .get("TagList")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .find(|tag| {
                tag.get("Key").and_then(Value::as_str) == Some(ctx.settings.secret_tag_key.as_str())
            })
            .and_then(|tag| tag.get("Value").and_then(Value::as_str))
            .filter(|value| !value.is_empty());

        match env_var_name {
            Some(env_var_name) => secrets.push(json!({
                "name": env_var_name,
                "valueFrom": name,
            })),
            None => logger.debug("Skipping untagged parameter", &name),
        }
    }

    logger.info("Mapped secrets", json!({"count": secrets.len()}));
    Ok(secrets)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patterns_match_whole_names() {
        let engines =
            compile_patterns(&["db_.*".to_string()]).expect("pattern should compile");

        assert!(engines[0].is_match("db_password"));
        assert!(!engines[0].is_match("prod_db_password"));
    }

    #[test]
    fn invalid_patterns_fault() {
        let error = compile_patterns(&["db_(".to_string()]).expect_err("unbalanced group");

        assert_eq!(error.kind(), FaultKind::InvalidPattern);
    }
}
