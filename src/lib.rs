//! SlipDesk - 学校外出许可单审批服务
//!
//! 学生填写许可单，家长签字后由教职工批准或驳回。
//! 状态机集中在 `workflow`，其余模块负责认证、持久化与 HTTP 接入。
//!
//! # 架构
//! - `cache`: 对象缓存（Moka）
//! - `config`: 配置管理
//! - `entity`: SeaORM 数据库实体
//! - `errors`: 统一错误处理
//! - `middlewares`: 认证、授权与限流中间件
//! - `models`: 数据模型定义
//! - `routes`: API 路由层
//! - `runtime`: 运行时生命周期管理
//! - `services`: 业务逻辑层
//! - `storage`: 数据存储层（SeaORM，含条件写入）
//! - `utils`: 工具函数
//! - `workflow`: 审批流程引擎（纯函数）

pub mod cache;
pub mod config;
pub mod entity;
pub mod errors;
pub mod middlewares;
pub mod models;
pub mod routes;
pub mod runtime;
pub mod services;
pub mod storage;
pub mod utils;
pub mod workflow;
