use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ChartError, ChartResult};

use super::{ChartConfig, ChartSpec};

pub const CHART_CONFIG_JSON_SCHEMA_V1: u32 = 1;
pub const CHART_SPEC_JSON_SCHEMA_V1: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartConfigJsonContractV1 {
    pub schema_version: u32,
    pub config: ChartConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSpecJsonContractV1 {
    pub schema_version: u32,
    pub spec: ChartSpec,
}

/// Payloads carrying a `schema_version` key are enveloped; anything else is
/// read as the bare value.
fn is_enveloped(input: &str) -> bool {
    matches!(
        serde_json::from_str::<Value>(input),
        Ok(Value::Object(map)) if map.contains_key("schema_version")
    )
}

impl ChartConfig {
    pub fn to_json_pretty(&self) -> ChartResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| ChartError::InvalidData(format!("failed to serialize chart config: {e}")))
    }

    pub fn to_json_contract_v1_pretty(&self) -> ChartResult<String> {
        let payload = ChartConfigJsonContractV1 {
            schema_version: CHART_CONFIG_JSON_SCHEMA_V1,
            config: self.clone(),
        };
        serde_json::to_string_pretty(&payload).map_err(|e| {
            ChartError::InvalidData(format!("failed to serialize chart config contract v1: {e}"))
        })
    }

    pub fn from_json_compat_str(input: &str) -> ChartResult<Self> {
        if !is_enveloped(input) {
            return serde_json::from_str::<ChartConfig>(input).map_err(|e| {
                ChartError::InvalidConfig(format!("failed to parse chart config json: {e}"))
            });
        }
        let payload: ChartConfigJsonContractV1 = serde_json::from_str(input).map_err(|e| {
            ChartError::InvalidConfig(format!("failed to parse chart config json payload: {e}"))
        })?;
        if payload.schema_version != CHART_CONFIG_JSON_SCHEMA_V1 {
            return Err(ChartError::InvalidData(format!(
                "unsupported chart config schema version: {}",
                payload.schema_version
            )));
        }
        Ok(payload.config)
    }
}

impl ChartSpec {
    pub fn to_json_pretty(&self) -> ChartResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| ChartError::InvalidData(format!("failed to serialize chart spec: {e}")))
    }

    pub fn to_json_contract_v1_pretty(&self) -> ChartResult<String> {
        let payload = ChartSpecJsonContractV1 {
            schema_version: CHART_SPEC_JSON_SCHEMA_V1,
            spec: self.clone(),
        };
        serde_json::to_string_pretty(&payload).map_err(|e| {
            ChartError::InvalidData(format!("failed to serialize chart spec contract v1: {e}"))
        })
    }

    pub fn from_json_compat_str(input: &str) -> ChartResult<Self> {
        if !is_enveloped(input) {
            return serde_json::from_str::<ChartSpec>(input).map_err(|e| {
                ChartError::InvalidData(format!("failed to parse chart spec json: {e}"))
            });
        }
        let payload: ChartSpecJsonContractV1 = serde_json::from_str(input).map_err(|e| {
            ChartError::InvalidData(format!("failed to parse chart spec json payload: {e}"))
        })?;
        if payload.schema_version != CHART_SPEC_JSON_SCHEMA_V1 {
            return Err(ChartError::InvalidData(format!(
                "unsupported chart spec schema version: {}",
                payload.schema_version
            )));
        }
        Ok(payload.spec)
    }
}
