//! # 晕质量函数模块
//!
//! 从线性功率谱到 dn/dM 的完整流水线。
//!
//! ## 子模块
//! - `params`: Tinker08 参数表
//! - `fitting`: 多重性函数 f(σ)
//! - `tophat`: 球形 top-hat 变换后端
//! - `variance`: σ(R) 与 dσ/dR
//! - `mass_function`: 质量函数组装
//! - `export`: CSV 导出
//! - `plot`: 图表生成
//!
//! ## 依赖关系
//! - 被 `commands/` 与 `cosmology/spectrum.rs` 使用
//! - 使用 `cosmology/`, `numeric/`

pub mod export;
pub mod fitting;
pub mod mass_function;
pub mod params;
pub mod plot;
pub mod tophat;
pub mod variance;

pub use fitting::{FittingFunction, HmfFamily, MassDefinition};
pub use mass_function::{HaloMassFunction, HmfConfig, MassFunctionResult};
pub use params::{FitParameter, ParameterTable};
pub use tophat::{QuadratureTophat, TophatTransform};
pub use variance::{mass_to_radius, radius_to_mass, DerivativeMode, SigmaAtMass, VarianceField};
