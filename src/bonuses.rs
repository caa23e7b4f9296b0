//! Structure, rig and security bonus tables and default settings

use std::fmt;
use std::str::FromStr;

use crate::error::{IndustryError, Result};
use crate::models::{IndustrySettings, RigBonus, StructureBonus};

pub const DEFAULT_BLUEPRINT_ME: u32 = 10;
pub const DEFAULT_BLUEPRINT_TE: u32 = 20;
pub const DEFAULT_COMPONENT_ME: u32 = 10;
pub const DEFAULT_COMPONENT_TE: u32 = 20;
pub const DEFAULT_SYSTEM_COST_INDEX: f64 = 0.05;
pub const DEFAULT_FACILITY_TAX: f64 = 0.0;

/// Flat multiplier applied to the estimated material value of a job.
///
/// Doesn't match the published job cost formula; kept as-is and overridable
/// through [`IndustrySettings::job_cost_scale`] until someone confirms it.
pub const JOB_COST_SCALE: f64 = 0.02;

pub const MAX_BLUEPRINT_ME: u32 = 10;
pub const MAX_BLUEPRINT_TE: u32 = 20;
pub const MAX_RUNS_PER_BATCH: u64 = 1_000_000;
pub const MAX_NUMBER_OF_BATCHES: u64 = 1_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StructureType {
    #[default]
    Station,
    Raitaru,
    Azbel,
    Sotiyo,
    Athanor,
    Tatara,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RigType {
    #[default]
    None,
    T1MaterialEfficiency,
    T2MaterialEfficiency,
    T1TimeEfficiency,
    T2TimeEfficiency,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SecurityClass {
    #[default]
    HighSec,
    LowSec,
    NullSec,
    Wormhole,
}

impl StructureType {
    pub const ALL: [StructureType; 6] = [
        StructureType::Station,
        StructureType::Raitaru,
        StructureType::Azbel,
        StructureType::Sotiyo,
        StructureType::Athanor,
        StructureType::Tatara,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StructureType::Station => "station",
            StructureType::Raitaru => "raitaru",
            StructureType::Azbel => "azbel",
            StructureType::Sotiyo => "sotiyo",
            StructureType::Athanor => "athanor",
            StructureType::Tatara => "tatara",
        }
    }

    pub fn bonus(&self) -> StructureBonus {
        let (material_efficiency, time_efficiency, job_cost) = match self {
            StructureType::Station => (0.0, 0.0, 0.0),
            StructureType::Raitaru => (0.01, 0.15, 0.03),
            StructureType::Azbel => (0.01, 0.20, 0.04),
            StructureType::Sotiyo => (0.01, 0.30, 0.05),
            StructureType::Athanor => (0.0, 0.0, 0.0),
            StructureType::Tatara => (0.0, 0.25, 0.0),
        };
        StructureBonus {
            material_efficiency,
            time_efficiency,
            job_cost,
        }
    }
}

impl RigType {
    pub const ALL: [RigType; 5] = [
        RigType::None,
        RigType::T1MaterialEfficiency,
        RigType::T2MaterialEfficiency,
        RigType::T1TimeEfficiency,
        RigType::T2TimeEfficiency,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RigType::None => "none",
            RigType::T1MaterialEfficiency => "t1-me",
            RigType::T2MaterialEfficiency => "t2-me",
            RigType::T1TimeEfficiency => "t1-te",
            RigType::T2TimeEfficiency => "t2-te",
        }
    }

    pub fn bonus(&self) -> RigBonus {
        let (material_efficiency, time_efficiency) = match self {
            RigType::None => (0.0, 0.0),
            RigType::T1MaterialEfficiency => (0.02, 0.0),
            RigType::T2MaterialEfficiency => (0.024, 0.0),
            RigType::T1TimeEfficiency => (0.0, 0.20),
            RigType::T2TimeEfficiency => (0.0, 0.24),
        };
        RigBonus {
            material_efficiency,
            time_efficiency,
        }
    }
}

impl SecurityClass {
    pub const ALL: [SecurityClass; 4] = [
        SecurityClass::HighSec,
        SecurityClass::LowSec,
        SecurityClass::NullSec,
        SecurityClass::Wormhole,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SecurityClass::HighSec => "highsec",
            SecurityClass::LowSec => "lowsec",
            SecurityClass::NullSec => "nullsec",
            SecurityClass::Wormhole => "wormhole",
        }
    }

    /// Multiplier applied to rig bonuses
    pub fn multiplier(&self) -> f64 {
        match self {
            SecurityClass::HighSec => 1.0,
            SecurityClass::LowSec => 1.9,
            SecurityClass::NullSec | SecurityClass::Wormhole => 2.1,
        }
    }
}

fn parse_option<T: Copy>(all: &[T], name: fn(&T) -> &'static str, kind: &'static str, value: &str) -> Result<T> {
    let needle = value.trim().to_lowercase();
    all.iter()
        .find(|option| name(option) == needle)
        .copied()
        .ok_or_else(|| IndustryError::UnknownOption {
            kind,
            value: value.to_string(),
        })
}

impl FromStr for StructureType {
    type Err = IndustryError;

    fn from_str(s: &str) -> Result<Self> {
        parse_option(&Self::ALL, Self::as_str, "structure", s)
    }
}

impl FromStr for RigType {
    type Err = IndustryError;

    fn from_str(s: &str) -> Result<Self> {
        parse_option(&Self::ALL, Self::as_str, "rig", s)
    }
}

impl FromStr for SecurityClass {
    type Err = IndustryError;

    fn from_str(s: &str) -> Result<Self> {
        parse_option(&Self::ALL, Self::as_str, "security", s)
    }
}

impl fmt::Display for StructureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl fmt::Display for RigType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl fmt::Display for SecurityClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Raw settings as they arrive from the CLI, every field optional
#[derive(Debug, Clone, Default)]
pub struct SettingsRequest {
    pub blueprint_me: Option<u32>,
    pub blueprint_te: Option<u32>,
    pub runs_per_batch: Option<u64>,
    pub number_of_batches: Option<u64>,
    pub structure: Option<String>,
    pub rig: Option<String>,
    pub security: Option<String>,
    pub component_me: Option<u32>,
    pub component_te: Option<u32>,
    pub system_cost_index: Option<f64>,
    pub facility_tax: Option<f64>,
    pub job_cost_scale: Option<f64>,
}

/// Fill in defaults, look up bonus tables and validate ranges
pub fn resolve_settings(request: &SettingsRequest) -> Result<IndustrySettings> {
    let structure = match &request.structure {
        Some(value) => value.parse::<StructureType>()?,
        None => StructureType::default(),
    };
    let rig = match &request.rig {
        Some(value) => value.parse::<RigType>()?,
        None => RigType::default(),
    };
    let security = match &request.security {
        Some(value) => value.parse::<SecurityClass>()?,
        None => SecurityClass::default(),
    };

    let settings = IndustrySettings {
        blueprint_me: request.blueprint_me.unwrap_or(DEFAULT_BLUEPRINT_ME),
        blueprint_te: request.blueprint_te.unwrap_or(DEFAULT_BLUEPRINT_TE),
        runs_per_batch: request.runs_per_batch.unwrap_or(1),
        number_of_batches: request.number_of_batches.unwrap_or(1),
        structure: structure.bonus(),
        rig: rig.bonus(),
        security_multiplier: security.multiplier(),
        component_me: request.component_me.unwrap_or(DEFAULT_COMPONENT_ME),
        component_te: request.component_te.unwrap_or(DEFAULT_COMPONENT_TE),
        system_cost_index: request.system_cost_index.unwrap_or(DEFAULT_SYSTEM_COST_INDEX),
        facility_tax: request.facility_tax.unwrap_or(DEFAULT_FACILITY_TAX),
        job_cost_scale: request.job_cost_scale.unwrap_or(JOB_COST_SCALE),
    };
    validate_settings(&settings)?;
    Ok(settings)
}

impl Default for IndustrySettings {
    fn default() -> Self {
        IndustrySettings {
            blueprint_me: DEFAULT_BLUEPRINT_ME,
            blueprint_te: DEFAULT_BLUEPRINT_TE,
            runs_per_batch: 1,
            number_of_batches: 1,
            structure: StructureType::default().bonus(),
            rig: RigType::default().bonus(),
            security_multiplier: SecurityClass::default().multiplier(),
            component_me: DEFAULT_COMPONENT_ME,
            component_te: DEFAULT_COMPONENT_TE,
            system_cost_index: DEFAULT_SYSTEM_COST_INDEX,
            facility_tax: DEFAULT_FACILITY_TAX,
            job_cost_scale: JOB_COST_SCALE,
        }
    }
}

fn invalid(name: &'static str, value: impl ToString) -> IndustryError {
    IndustryError::InvalidSetting {
        name,
        value: value.to_string(),
    }
}

fn check_fraction(name: &'static str, value: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&value) {
        return Err(invalid(name, value));
    }
    Ok(())
}

/// Reject settings the formulas aren't defined for
pub fn validate_settings(settings: &IndustrySettings) -> Result<()> {
    if !(1..=MAX_RUNS_PER_BATCH).contains(&settings.runs_per_batch) {
        return Err(invalid("runs_per_batch", settings.runs_per_batch));
    }
    if !(1..=MAX_NUMBER_OF_BATCHES).contains(&settings.number_of_batches) {
        return Err(invalid("number_of_batches", settings.number_of_batches));
    }
    if settings.blueprint_me > MAX_BLUEPRINT_ME {
        return Err(invalid("blueprint_me", settings.blueprint_me));
    }
    if settings.component_me > MAX_BLUEPRINT_ME {
        return Err(invalid("component_me", settings.component_me));
    }
    if settings.blueprint_te > MAX_BLUEPRINT_TE {
        return Err(invalid("blueprint_te", settings.blueprint_te));
    }
    if settings.component_te > MAX_BLUEPRINT_TE {
        return Err(invalid("component_te", settings.component_te));
    }

    check_fraction("structure.material_efficiency", settings.structure.material_efficiency)?;
    check_fraction("structure.time_efficiency", settings.structure.time_efficiency)?;
    check_fraction("structure.job_cost", settings.structure.job_cost)?;
    check_fraction("rig.material_efficiency", settings.rig.material_efficiency)?;
    check_fraction("rig.time_efficiency", settings.rig.time_efficiency)?;
    check_fraction("system_cost_index", settings.system_cost_index)?;
    check_fraction("facility_tax", settings.facility_tax)?;

    if !(settings.security_multiplier.is_finite() && settings.security_multiplier >= 1.0) {
        return Err(invalid("security_multiplier", settings.security_multiplier));
    }
    if !(settings.job_cost_scale.is_finite() && settings.job_cost_scale >= 0.0) {
        return Err(invalid("job_cost_scale", settings.job_cost_scale));
    }
    Ok(())
}
