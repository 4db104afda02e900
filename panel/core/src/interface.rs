//! Contract Interface Description
//!
//! Loads the contract's JSON ABI once at startup and uses it to encode calls
//! and decode results at runtime. Nothing about the contract's methods is
//! compiled in; a missing or mismatched function surfaces as an
//! [`InterfaceError`] at call time.
//!
//! Both a bare ABI array and a build artifact object with an `abi` key are
//! accepted.

use std::path::PathBuf;

use alloy_dyn_abi::{DynSolType, DynSolValue, FunctionExt, JsonAbiExt};
use alloy_json_abi::{Function, JsonAbi};
use alloy_primitives::Bytes;
use thiserror::Error;

/// Selector of the standard `Error(string)` revert payload
const ERROR_STRING_SELECTOR: [u8; 4] = [0x08, 0xc3, 0x79, 0xa0];

/// Where the interface description is loaded from
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InterfaceSource {
    /// Local JSON file
    File(PathBuf),
    /// JSON served over HTTP(S)
    Url(String),
}

impl InterfaceSource {
    /// Interpret a configured location: `http(s)://` is a URL, anything else a path
    #[must_use]
    pub fn parse(location: &str) -> Self {
        if location.starts_with("http://") || location.starts_with("https://") {
            Self::Url(location.to_string())
        } else {
            Self::File(PathBuf::from(location))
        }
    }
}

impl std::fmt::Display for InterfaceSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Url(url) => f.write_str(url),
        }
    }
}

/// Errors loading or using the interface description
#[derive(Debug, Error)]
pub enum InterfaceError {
    /// Failed to read a local file
    #[error("Failed to read interface description at {path}: {source}")]
    Read {
        /// The path that was attempted
        path: PathBuf,
        /// The underlying IO error
        source: std::io::Error,
    },

    /// Failed to fetch a remote description
    #[error("Failed to fetch interface description from {url}: {message}")]
    Fetch {
        /// The URL that was attempted
        url: String,
        /// Error description
        message: String,
    },

    /// The document is not a JSON ABI
    #[error("Failed to parse interface description: {0}")]
    Parse(#[from] serde_json::Error),

    /// No function with that name and arity
    #[error("Contract interface has no function {name} taking {arity} argument(s)")]
    MissingFunction {
        /// Function name
        name: String,
        /// Number of arguments supplied
        arity: usize,
    },

    /// Arguments could not be encoded
    #[error("Failed to encode call to {name}: {message}")]
    Encode {
        /// Function name
        name: String,
        /// Error description
        message: String,
    },

    /// Return data could not be decoded
    #[error("Failed to decode result of {name}: {message}")]
    Decode {
        /// Function name
        name: String,
        /// Error description
        message: String,
    },
}

/// Parsed contract interface
#[derive(Clone, Debug)]
pub struct ContractInterface {
    abi: JsonAbi,
}

impl ContractInterface {
    /// Parse an interface description from JSON text
    pub fn from_json(json: &str) -> Result<Self, InterfaceError> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        let abi_value = match value {
            serde_json::Value::Object(mut artifact) if artifact.contains_key("abi") => {
                artifact.remove("abi").unwrap_or_default()
            }
            other => other,
        };
        let abi: JsonAbi = serde_json::from_value(abi_value)?;
        Ok(Self { abi })
    }

    /// Load the interface description from its source
    pub async fn load(source: &InterfaceSource) -> Result<Self, InterfaceError> {
        let json = match source {
            InterfaceSource::File(path) => {
                tokio::fs::read_to_string(path)
                    .await
                    .map_err(|source| InterfaceError::Read {
                        path: path.clone(),
                        source,
                    })?
            }
            InterfaceSource::Url(url) => fetch(url).await?,
        };

        let interface = Self::from_json(&json)?;
        tracing::info!(
            source = %source,
            functions = interface.function_count(),
            "Loaded contract interface"
        );
        Ok(interface)
    }

    /// The parsed ABI
    #[must_use]
    pub fn abi(&self) -> &JsonAbi {
        &self.abi
    }

    /// Number of functions described (overloads counted separately)
    #[must_use]
    pub fn function_count(&self) -> usize {
        self.abi.functions().count()
    }

    /// Whether a function with this name is described
    #[must_use]
    pub fn has_function(&self, name: &str) -> bool {
        self.abi.function(name).is_some_and(|f| !f.is_empty())
    }

    /// Find the overload of `name` taking `arity` arguments
    pub fn function(&self, name: &str, arity: usize) -> Result<&Function, InterfaceError> {
        self.abi
            .function(name)
            .and_then(|overloads| overloads.iter().find(|f| f.inputs.len() == arity))
            .ok_or_else(|| InterfaceError::MissingFunction {
                name: name.to_string(),
                arity,
            })
    }

    /// Encode selector-prefixed calldata for `name(args...)`
    pub fn encode_call(&self, name: &str, args: &[DynSolValue]) -> Result<Bytes, InterfaceError> {
        let function = self.function(name, args.len())?;
        function
            .abi_encode_input(args)
            .map(Bytes::from)
            .map_err(|e| InterfaceError::Encode {
                name: name.to_string(),
                message: e.to_string(),
            })
    }

    /// Decode the return data of `name` called with `arity` arguments
    pub fn decode_output(
        &self,
        name: &str,
        arity: usize,
        data: &[u8],
    ) -> Result<Vec<DynSolValue>, InterfaceError> {
        let function = self.function(name, arity)?;
        function
            .abi_decode_output(data)
            .map_err(|e| InterfaceError::Decode {
                name: name.to_string(),
                message: e.to_string(),
            })
    }

    /// Name of the custom error whose selector prefixes `revert_data`, if declared
    #[must_use]
    pub fn decode_error(&self, revert_data: &[u8]) -> Option<&str> {
        let selector = revert_data.get(..4)?;
        self.abi
            .errors()
            .find(|error| error.selector().as_slice() == selector)
            .map(|error| error.name.as_str())
    }
}

/// Extract the message of a standard `Error(string)` revert payload
#[must_use]
pub fn decode_revert_string(revert_data: &[u8]) -> Option<String> {
    let payload = revert_data.strip_prefix(&ERROR_STRING_SELECTOR)?;
    match DynSolType::String.abi_decode(payload).ok()? {
        DynSolValue::String(message) => Some(message),
        _ => None,
    }
}

async fn fetch(url: &str) -> Result<String, InterfaceError> {
    let fetch_error = |message: String| InterfaceError::Fetch {
        url: url.to_string(),
        message,
    };

    let response = reqwest::get(url)
        .await
        .map_err(|e| fetch_error(e.to_string()))?;
    if !response.status().is_success() {
        return Err(fetch_error(format!("HTTP {}", response.status())));
    }
    response.text().await.map_err(|e| fetch_error(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{Address, U256};

    const ABI: &str = include_str!("../abi.json");

    #[test]
    fn test_bundled_abi_parses() {
        let interface = ContractInterface::from_json(ABI).expect("bundled ABI");
        for name in [
            "deposit",
            "transfer",
            "setGuardian",
            "setHighValueThreshold",
            "setRiskyAddress",
            "setTrustedAddress",
            "toggleSafeMode",
            "manualFreeze",
            "guardianFreeze",
            "unfreeze",
            "getStatus",
        ] {
            assert!(interface.has_function(name), "missing {name}");
        }
    }

    #[test]
    fn test_artifact_wrapper_accepted() {
        let artifact = format!(r#"{{"contractName":"GuardedWallet","abi":{ABI}}}"#);
        let interface = ContractInterface::from_json(&artifact).expect("artifact ABI");
        assert!(interface.has_function("getStatus"));
    }

    #[test]
    fn test_encode_call_prefixes_selector() {
        let interface = ContractInterface::from_json(ABI).expect("bundled ABI");
        let to = Address::repeat_byte(0x11);
        let data = interface
            .encode_call(
                "transfer",
                &[DynSolValue::Address(to), DynSolValue::Uint(U256::from(5u64), 256)],
            )
            .expect("encodes");

        let selector = interface.function("transfer", 2).expect("fn").selector();
        assert_eq!(&data[..4], selector.as_slice());
        assert_eq!(data.len(), 4 + 64);
    }

    #[test]
    fn test_wrong_arity_is_missing_function() {
        let interface = ContractInterface::from_json(ABI).expect("bundled ABI");
        let err = interface.encode_call("deposit", &[DynSolValue::Bool(true)]);
        assert!(matches!(
            err,
            Err(InterfaceError::MissingFunction { arity: 1, .. })
        ));
    }

    #[test]
    fn test_decode_status_output() {
        let interface = ContractInterface::from_json(ABI).expect("bundled ABI");
        let values = vec![
            DynSolValue::Bool(false),
            DynSolValue::Uint(U256::from(1u64), 256),
            DynSolValue::Uint(U256::ZERO, 256),
            DynSolValue::Bool(true),
            DynSolValue::Address(Address::repeat_byte(0x11)),
            DynSolValue::Address(Address::ZERO),
        ];
        let data = DynSolValue::Tuple(values.clone()).abi_encode_params();

        let decoded = interface
            .decode_output("getStatus", 0, &data)
            .expect("decodes");
        assert_eq!(decoded, values);
    }

    #[test]
    fn test_decode_custom_error() {
        let interface = ContractInterface::from_json(ABI).expect("bundled ABI");
        let error = interface
            .abi
            .errors()
            .find(|e| e.name == "TimelockActive")
            .expect("declared error");
        let mut data = error.selector().to_vec();
        data.extend_from_slice(&[0u8; 32]);
        assert_eq!(interface.decode_error(&data), Some("TimelockActive"));
        assert_eq!(interface.decode_error(&[0xde, 0xad]), None);
    }

    #[test]
    fn test_decode_revert_string() {
        let mut data = ERROR_STRING_SELECTOR.to_vec();
        data.extend(DynSolValue::String("Timelock not expired".into()).abi_encode());
        assert_eq!(
            decode_revert_string(&data).as_deref(),
            Some("Timelock not expired")
        );
        assert_eq!(decode_revert_string(&[1, 2, 3, 4]), None);
    }

    #[test]
    fn test_source_parse() {
        assert_eq!(
            InterfaceSource::parse("https://example.org/abi.json"),
            InterfaceSource::Url("https://example.org/abi.json".to_string())
        );
        assert_eq!(
            InterfaceSource::parse("abi.json"),
            InterfaceSource::File(PathBuf::from("abi.json"))
        );
    }
}
