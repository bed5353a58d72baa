//! # 数值工具模块
//!
//! 插值、差分、网格与积分等基础数值例程。
//!
//! ## 子模块
//! - `interp`: 线性插值（边界钳制）、非均匀网格梯度、线性/几何网格
//! - `quadrature`: 复合 Simpson 积分
//!
//! ## 依赖关系
//! - 被 `cosmology/` 与 `hmf/` 使用
//! - 使用 `error.rs`

pub mod interp;
pub mod quadrature;

pub use interp::{geomspace, gradient, interp, interp_many, linspace};
pub use quadrature::simpson;
