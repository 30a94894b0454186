//! OpenAPI document for the coverage API.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::openapi::server::{ServerBuilder, ServerVariableBuilder};
use utoipa::{Modify, OpenApi};

use super::auth::API_TOKEN_HEADER;
use super::dto::{CoverageListResponse, HealthResponse, MessageResponse, PaginationMeta};
use super::error::ApiError;
use super::handlers;
use crate::models::{Coverage, CoverageDraft, CoverageKey};

const CODE_ENGINE_URL: &str = "https://{appname}.{projectid}.{region}.codeengine.appdomain.cloud";
const LOCAL_URL: &str = "http://127.0.0.1:{port}";

#[derive(OpenApi)]
#[openapi(
    info(
        title = "SA_Coverages API for Watson Assistant",
        version = "1.0.0",
        description = "Lookup and maintenance API for South America coverage records."
    ),
    paths(
        handlers::root,
        handlers::health_check,
        handlers::get_coverage_by_gbg,
        handlers::get_coverage_by_name,
        handlers::list_coverages,
        handlers::create_coverage,
        handlers::delete_coverage,
        handlers::recreate_database,
    ),
    components(schemas(
        Coverage,
        CoverageDraft,
        CoverageKey,
        CoverageListResponse,
        PaginationMeta,
        MessageResponse,
        HealthResponse,
        ApiError,
    )),
    modifiers(&SecurityAddon, &ServersAddon),
    tags(
        (name = "service", description = "Service information"),
        (name = "coverages", description = "Coverage records"),
        (name = "maintenance", description = "Destructive table maintenance")
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "ApiKey",
            SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new(API_TOKEN_HEADER))),
        );
    }
}

struct ServersAddon;

impl Modify for ServersAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let code_engine = ServerBuilder::new()
            .url(CODE_ENGINE_URL)
            .description(Some("Code Engine deployment"))
            .parameter(
                "appname",
                ServerVariableBuilder::new()
                    .default_value("myapp")
                    .description(Some("Application name"))
                    .build(),
            )
            .parameter(
                "projectid",
                ServerVariableBuilder::new()
                    .default_value("projectid")
                    .description(Some("Project ID"))
                    .build(),
            )
            .parameter(
                "region",
                ServerVariableBuilder::new()
                    .default_value("us-south")
                    .description(Some("Region"))
                    .build(),
            )
            .build();

        let local = ServerBuilder::new()
            .url(LOCAL_URL)
            .description(Some("Local test server"))
            .parameter(
                "port",
                ServerVariableBuilder::new()
                    .default_value("5000")
                    .description(Some("Port"))
                    .build(),
            )
            .build();

        openapi.servers = Some(vec![code_engine, local]);
    }
}

/// Build the OpenAPI document.
pub fn openapi() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

/// Serialize the OpenAPI document as pretty JSON.
pub fn openapi_json() -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&openapi())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn document() -> Value {
        serde_json::from_str(&openapi_json().unwrap()).unwrap()
    }

    #[test]
    fn test_info() {
        let doc = document();
        assert_eq!(doc["info"]["title"], "SA_Coverages API for Watson Assistant");
        assert_eq!(doc["info"]["version"], "1.0.0");
    }

    #[test]
    fn test_security_scheme_uses_token_header() {
        let doc = document();
        let scheme = &doc["components"]["securitySchemes"]["ApiKey"];
        assert_eq!(scheme["type"], "apiKey");
        assert_eq!(scheme["in"], "header");
        assert_eq!(scheme["name"], "API_TOKEN");
    }

    #[test]
    fn test_servers() {
        let doc = document();
        let servers = doc["servers"].as_array().unwrap();
        assert_eq!(servers.len(), 2);
        assert_eq!(servers[0]["url"], CODE_ENGINE_URL);
        assert_eq!(servers[0]["variables"]["region"]["default"], "us-south");
        assert_eq!(servers[1]["variables"]["port"]["default"], "5000");
    }

    #[test]
    fn test_paths_present() {
        let doc = document();
        let paths = doc["paths"].as_object().unwrap();
        for path in [
            "/",
            "/health",
            "/coverages",
            "/coverages/gbg/{gbg}",
            "/coverages/name/{short_name}",
            "/coverages/{index}",
            "/database/recreate",
        ] {
            assert!(paths.contains_key(path), "missing {}", path);
        }
        assert!(paths["/coverages"].get("post").is_some());
    }
}
