//! Runtime configuration.

use query_engine_metadata::metadata;
use schemars::{gen::SchemaSettings, schema::RootSchema};

use crate::environment::Environment;
use crate::error::MakeRuntimeConfigurationError;
use crate::values::{ConnectionUri, PoolSettings, Secret};
use crate::version1::{CompilerSettings, ParsedConfiguration};

/// The 'Configuration' type collects all the information necessary to compile and
/// run queries at runtime. It is produced from a 'ParsedConfiguration' using
/// 'make_runtime_configuration', which resolves every secret.
#[derive(Debug, Clone)]
pub struct Configuration {
    pub metadata: metadata::Metadata,
    pub pool_settings: PoolSettings,
    pub connection_uri: String,
    pub compiler: CompilerSettings,
}

/// The JSON schema of the current configuration format.
pub fn generate_latest_schema() -> RootSchema {
    SchemaSettings::draft07()
        .into_generator()
        .into_root_schema_for::<ParsedConfiguration>()
}

/// Resolve secrets and produce the runtime configuration.
pub fn make_runtime_configuration(
    parsed_config: ParsedConfiguration,
    environment: impl Environment,
) -> Result<Configuration, MakeRuntimeConfigurationError> {
    let connection_uri = match parsed_config.connection_uri {
        ConnectionUri(Secret::Plain(uri)) => uri,
        ConnectionUri(Secret::FromEnvironment { variable }) => {
            environment.read(&variable).map_err(|error| {
                MakeRuntimeConfigurationError::MissingEnvironmentVariable {
                    setting: "connectionUri",
                    error,
                }
            })?
        }
    };

    Ok(Configuration {
        metadata: parsed_config.metadata,
        pool_settings: parsed_config.pool_settings,
        connection_uri,
        compiler: parsed_config.compiler,
    })
}
