//! # 物理常数
//!
//! 质量函数计算需要的少量 SI 常数，以及由它们导出的单位换算。
//!
//! ## 依赖关系
//! - 被 `cosmology/background.rs` 和 `hmf/mass_function.rs` 使用
//! - 纯静态数据，无外部依赖

/// 光速 (m/s)
pub const SPEED_OF_LIGHT: f64 = 2.997_924_58e8;

/// 引力常数 (m³ kg⁻¹ s⁻²)
pub const GRAVITATIONAL_CONSTANT: f64 = 6.674e-11;

/// 太阳质量 (kg)
pub const SOLAR_MASS: f64 = 1.988_55e30;

/// 1 Mpc 对应的米数
pub const MEGAPARSEC: f64 = 3.085_677_581_491_37e22;

/// 物理常数集合
///
/// 创建后不可变。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysicalConstants {
    pub speed_of_light: f64,
    pub gravitational_constant: f64,
    pub solar_mass: f64,
    pub megaparsec_in_meters: f64,
}

impl Default for PhysicalConstants {
    fn default() -> Self {
        Self {
            speed_of_light: SPEED_OF_LIGHT,
            gravitational_constant: GRAVITATIONAL_CONSTANT,
            solar_mass: SOLAR_MASS,
            megaparsec_in_meters: MEGAPARSEC,
        }
    }
}

impl PhysicalConstants {
    /// 光速 (km/s)
    pub fn speed_of_light_kms(&self) -> f64 {
        self.speed_of_light * 1e-3
    }

    /// 密度换算: kg/m³ -> M_sun/Mpc³
    pub fn kg_m3_to_msun_mpc3(&self) -> f64 {
        self.megaparsec_in_meters.powi(3) / self.solar_mass
    }

    /// Hubble 率换算: km/s/Mpc -> 1/s
    pub fn kms_mpc_to_per_second(&self) -> f64 {
        1e3 / self.megaparsec_in_meters
    }
}
