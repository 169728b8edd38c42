// ABOUTME: Resolves the MMSC endpoint and proxy for the current operator
// ABOUTME: Tries the platform service, then a static carrier table, then legacy APN records

use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// HTTP proxy in front of an MMSC
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProxyAddr {
    pub host: String,
    pub port: u16,
}

impl ProxyAddr {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

/// Where to send and fetch MMS PDUs
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MmsConfig {
    pub mmsc_url: String,
    pub proxy: Option<ProxyAddr>,
}

impl MmsConfig {
    pub fn new(mmsc_url: impl Into<String>) -> Self {
        Self {
            mmsc_url: mmsc_url.into(),
            proxy: None,
        }
    }

    pub fn with_proxy(mut self, host: impl Into<String>, port: u16) -> Self {
        self.proxy = Some(ProxyAddr::new(host, port));
        self
    }

    fn is_usable(&self) -> bool {
        !self.mmsc_url.trim().is_empty()
    }
}

/// Identity of the serving operator
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OperatorInfo {
    /// MCC followed by MNC, e.g. `"310260"`
    pub network_code: String,
    pub display_name: String,
}

impl OperatorInfo {
    pub fn new(network_code: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            network_code: network_code.into(),
            display_name: display_name.into(),
        }
    }
}

/// Platform-provided carrier configuration (first tier)
pub trait CarrierConfigService: Send + Sync {
    fn mms_config(&self, operator: &OperatorInfo) -> Option<MmsConfig>;
}

/// One row of the static carrier table
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CarrierEntry {
    pub network_codes: Vec<String>,
    /// Matched case-insensitively as a substring of the operator display name
    pub name: String,
    pub config: MmsConfig,
}

/// Static carrier table (second tier)
#[derive(Clone, Debug, Default)]
pub struct CarrierTable {
    entries: Vec<CarrierEntry>,
}

impl CarrierTable {
    pub fn new(entries: Vec<CarrierEntry>) -> Self {
        Self { entries }
    }

    pub fn push(&mut self, entry: CarrierEntry) {
        self.entries.push(entry);
    }

    /// Look up by network code first, then by display-name substring
    pub fn lookup(&self, operator: &OperatorInfo) -> Option<&MmsConfig> {
        if !operator.network_code.is_empty() {
            if let Some(entry) = self
                .entries
                .iter()
                .find(|e| e.network_codes.iter().any(|c| *c == operator.network_code))
            {
                return Some(&entry.config);
            }
        }

        let display = operator.display_name.to_lowercase();
        if display.is_empty() {
            return None;
        }
        self.entries
            .iter()
            .find(|e| !e.name.is_empty() && display.contains(&e.name.to_lowercase()))
            .map(|e| &e.config)
    }
}

#[derive(Debug, Error)]
pub enum ApnError {
    #[error("Access to APN settings denied by the platform")]
    AccessDenied,

    #[error("APN settings unavailable: {0}")]
    Unavailable(String),
}

/// A legacy APN record
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ApnRecord {
    pub apn: String,
    /// APN types, e.g. `["default", "mms"]`; `"*"` matches everything
    pub types: Vec<String>,
    pub mmsc: Option<String>,
    pub mms_proxy: Option<String>,
    pub mms_port: Option<u16>,
}

impl ApnRecord {
    fn serves_mms(&self) -> bool {
        self.types.iter().any(|t| t == "mms" || t == "*")
    }

    fn to_config(&self) -> Option<MmsConfig> {
        let mmsc = self.mmsc.as_deref().filter(|m| !m.trim().is_empty())?;
        let mut config = MmsConfig::new(mmsc);
        if let Some(host) = self.mms_proxy.as_deref().filter(|h| !h.trim().is_empty()) {
            config = config.with_proxy(host, self.mms_port.unwrap_or(80));
        }
        Some(config)
    }
}

/// Legacy APN database (third tier)
pub trait ApnSource: Send + Sync {
    fn apns(&self, operator: &OperatorInfo) -> Result<Vec<ApnRecord>, ApnError>;
}

/// Three-tier carrier configuration lookup.
///
/// # Example
///
/// ```rust
/// use mms::gateway::{CarrierConfigResolver, CarrierEntry, CarrierTable, MmsConfig, OperatorInfo};
///
/// let table = CarrierTable::new(vec![CarrierEntry {
///     network_codes: vec!["310260".into()],
///     name: "T-Mobile".into(),
///     config: MmsConfig::new("http://mms.msg.eng.t-mobile.com/mms/wapenc"),
/// }]);
/// let resolver = CarrierConfigResolver::new(OperatorInfo::new("", "T-Mobile US"))
///     .with_table(table);
/// assert!(resolver.resolve().is_some());
/// ```
#[derive(Clone, Default)]
pub struct CarrierConfigResolver {
    operator: OperatorInfo,
    platform: Option<Arc<dyn CarrierConfigService>>,
    table: CarrierTable,
    apns: Option<Arc<dyn ApnSource>>,
}

impl CarrierConfigResolver {
    pub fn new(operator: OperatorInfo) -> Self {
        Self {
            operator,
            ..Default::default()
        }
    }

    pub fn with_platform(mut self, service: Arc<dyn CarrierConfigService>) -> Self {
        self.platform = Some(service);
        self
    }

    pub fn with_table(mut self, table: CarrierTable) -> Self {
        self.table = table;
        self
    }

    pub fn with_apn_source(mut self, source: Arc<dyn ApnSource>) -> Self {
        self.apns = Some(source);
        self
    }

    pub fn operator(&self) -> &OperatorInfo {
        &self.operator
    }

    /// Resolve the MMSC configuration, or `None` when no tier has one.
    pub fn resolve(&self) -> Option<MmsConfig> {
        if let Some(config) = self
            .platform
            .as_ref()
            .and_then(|p| p.mms_config(&self.operator))
            .filter(MmsConfig::is_usable)
        {
            debug!(operator = %self.operator.display_name, "carrier config from platform");
            return Some(config);
        }

        if let Some(config) = self.table.lookup(&self.operator).filter(|c| c.is_usable()) {
            debug!(operator = %self.operator.display_name, "carrier config from table");
            return Some(config.clone());
        }

        let source = self.apns.as_ref()?;
        match source.apns(&self.operator) {
            Ok(records) => {
                let config = records
                    .iter()
                    .filter(|r| r.serves_mms())
                    .find_map(ApnRecord::to_config);
                if config.is_some() {
                    info!(operator = %self.operator.display_name, "carrier config from APN table");
                }
                config
            }
            Err(ApnError::AccessDenied) => {
                warn!("APN access denied, carrier config unavailable");
                None
            }
            Err(e) => {
                warn!(error = %e, "APN lookup failed");
                None
            }
        }
    }
}

impl std::fmt::Debug for CarrierConfigResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CarrierConfigResolver")
            .field("operator", &self.operator)
            .field("platform", &self.platform.is_some())
            .field("table", &self.table)
            .field("apns", &self.apns.is_some())
            .finish()
    }
}
