//! # 拟合函数参数表
//!
//! 按过密度阈值 Δ（相对平均密度）列表给出的拟合参数 (A, a, b, c)，
//! 任意 Δ 处用边界钳制的线性插值查询。
//!
//! ## 数据来源
//! Tinker et al. 2008, ApJ 688, 709, Table 2
//!
//! ## 依赖关系
//! - 被 `hmf/fitting.rs` 调用
//! - 使用 `numeric/interp.rs`
//! - 纯静态数据

use crate::error::{HmfError, Result};
use crate::hmf::fitting::{HmfFamily, MassDefinition};
use crate::numeric::interp;

use std::fmt;
use std::str::FromStr;

/// 拟合参数名
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FitParameter {
    /// 振幅 A
    Amplitude,
    /// 低质量端幂律斜率 a
    Slope,
    /// 幂律转折尺度 b
    Scale,
    /// 高质量端指数截断 c
    Cutoff,
}

impl FitParameter {
    pub const ALL: [FitParameter; 4] = [
        FitParameter::Amplitude,
        FitParameter::Slope,
        FitParameter::Scale,
        FitParameter::Cutoff,
    ];
}

impl FromStr for FitParameter {
    type Err = HmfError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "A" => Ok(FitParameter::Amplitude),
            "a" => Ok(FitParameter::Slope),
            "b" => Ok(FitParameter::Scale),
            "c" => Ok(FitParameter::Cutoff),
            other => Err(HmfError::config(format!(
                "unknown fitting parameter '{}' (expected A, a, b or c)",
                other
            ))),
        }
    }
}

impl fmt::Display for FitParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FitParameter::Amplitude => write!(f, "A"),
            FitParameter::Slope => write!(f, "a"),
            FitParameter::Scale => write!(f, "b"),
            FitParameter::Cutoff => write!(f, "c"),
        }
    }
}

/// 参数表
#[derive(Debug)]
pub struct ParameterTable {
    /// Δ 网格（严格递增）
    delta: &'static [f64],
    amplitude: &'static [f64],
    slope: &'static [f64],
    scale: &'static [f64],
    cutoff: &'static [f64],
}

/// Tinker08，Δ 相对平均密度
static TINKER08: ParameterTable = ParameterTable {
    delta: &[200.0, 300.0, 400.0, 600.0, 800.0, 1200.0, 1600.0, 2400.0, 3200.0],
    amplitude: &[0.186, 0.2, 0.212, 0.218, 0.248, 0.255, 0.260, 0.260, 0.260],
    slope: &[1.47, 1.52, 1.56, 1.61, 1.87, 2.13, 2.30, 2.53, 2.66],
    scale: &[2.57, 2.25, 2.05, 1.87, 1.59, 1.51, 1.46, 1.44, 1.41],
    cutoff: &[1.19, 1.27, 1.34, 1.45, 1.58, 1.80, 1.97, 2.24, 2.44],
};

impl ParameterTable {
    /// 取已注册的参数表
    pub fn for_model(family: HmfFamily, mass_definition: MassDefinition) -> &'static Self {
        match (family, mass_definition) {
            (HmfFamily::Tinker08, MassDefinition::Critical500) => &TINKER08,
        }
    }

    /// 由字符串标签取参数表，未注册组合返回 ConfigurationError
    pub fn from_tags(family: &str, mass_definition: &str) -> Result<&'static Self> {
        let family: HmfFamily = family.parse()?;
        let mass_definition: MassDefinition = mass_definition.parse()?;
        Ok(Self::for_model(family, mass_definition))
    }

    /// 在 Δ 处查询参数，超出网格时取边界值
    pub fn lookup(&self, parameter: FitParameter, delta: f64) -> f64 {
        interp(delta, self.delta, self.values(parameter))
    }

    /// Δ 网格
    pub fn deltas(&self) -> &[f64] {
        self.delta
    }

    /// 某参数的列表值
    pub fn values(&self, parameter: FitParameter) -> &[f64] {
        match parameter {
            FitParameter::Amplitude => self.amplitude,
            FitParameter::Slope => self.slope,
            FitParameter::Scale => self.scale,
            FitParameter::Cutoff => self.cutoff,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> &'static ParameterTable {
        ParameterTable::for_model(HmfFamily::Tinker08, MassDefinition::Critical500)
    }

    #[test]
    fn test_lookup_exact_node() {
        assert_eq!(table().lookup(FitParameter::Amplitude, 400.0), 0.212);
        assert_eq!(table().lookup(FitParameter::Slope, 1600.0), 2.30);
        assert_eq!(table().lookup(FitParameter::Cutoff, 3200.0), 2.44);
    }

    #[test]
    fn test_lookup_interpolates() {
        let b = table().lookup(FitParameter::Scale, 250.0);
        assert!((b - 0.5 * (2.57 + 2.25)).abs() < 1e-12);
    }

    #[test]
    fn test_lookup_clamps_outside_grid() {
        assert_eq!(table().lookup(FitParameter::Amplitude, 50.0), 0.186);
        assert_eq!(table().lookup(FitParameter::Scale, 1e5), 1.41);
    }

    #[test]
    fn test_table_shapes_consistent() {
        let t = table();
        for p in FitParameter::ALL {
            assert_eq!(t.values(p).len(), t.deltas().len());
        }
        assert!(t.deltas().windows(2).all(|w| w[1] > w[0]));
    }

    #[test]
    fn test_parameter_names_round_trip() {
        for p in FitParameter::ALL {
            assert_eq!(p.to_string().parse::<FitParameter>().unwrap(), p);
        }
        assert!("B".parse::<FitParameter>().is_err());
    }

    #[test]
    fn test_from_tags() {
        assert!(ParameterTable::from_tags("Tinker08", "500c").is_ok());
        let err = ParameterTable::from_tags("Tinker08", "200m").unwrap_err();
        assert!(matches!(err, HmfError::ConfigurationError(_)));
        let err = ParameterTable::from_tags("Press74", "500c").unwrap_err();
        assert!(matches!(err, HmfError::ConfigurationError(_)));
    }
}
