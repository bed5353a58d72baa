//! # halomass
//!
//! 晕质量函数计算库：top-hat 平滑方差 σ(R)、Tinker08 多重性函数、
//! 任意红移的 dn/dM 与 dn/dlnM。
//!
//! ## 模块
//! - `constants`: 物理常数
//! - `cosmology`: CosmologyProvider 接口与参考实现
//! - `hmf`: 质量函数流水线
//! - `numeric`: 插值、差分与求积
//! - `error`: 统一错误类型

pub mod constants;
pub mod cosmology;
pub mod error;
pub mod hmf;
pub mod numeric;

pub use cosmology::{CosmoParams, CosmologyProvider, FlatLambdaCdm, LinearCosmology, PowerSpectrum};
pub use error::{HmfError, Result};
pub use hmf::{DerivativeMode, HaloMassFunction, HmfConfig, HmfFamily, MassDefinition, MassFunctionResult};
