use std::sync::Arc;

use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::auth::JwtService;
use crate::cart::SessionStore;
use crate::core::Config;
use crate::db::DbService;
use crate::payment::{PaymentGateway, RedirectGateway};

/// 服务器状态 - 持有所有服务的共享引用
///
/// ServerState 是店面节点的核心数据结构。
/// 使用 Arc 实现浅拷贝，克隆成本极低。
///
/// # 服务组件
///
/// | 字段 | 类型 | 说明 |
/// |------|------|------|
/// | config | Config | 配置项 (不可变) |
/// | db | Surreal<Db> | 嵌入式数据库 |
/// | jwt_service | Arc<JwtService> | JWT 认证服务 |
/// | sessions | SessionStore | 匿名购物车会话存储 |
/// | payments | Arc<dyn PaymentGateway> | 在线支付跳转 (外部协作方) |
#[derive(Clone)]
pub struct ServerState {
    /// 服务器配置
    pub config: Config,
    /// 嵌入式数据库 (SurrealDB)
    pub db: Surreal<Db>,
    /// JWT 认证服务
    pub jwt_service: Arc<JwtService>,
    /// 匿名购物车会话存储 (进程内)
    pub sessions: SessionStore,
    /// 在线支付跳转服务
    pub payments: Arc<dyn PaymentGateway>,
}

impl ServerState {
    /// 创建服务器状态 (手动构造)
    ///
    /// 通常使用 [`ServerState::initialize`] 代替
    pub fn new(
        config: Config,
        db: Surreal<Db>,
        jwt_service: Arc<JwtService>,
        sessions: SessionStore,
        payments: Arc<dyn PaymentGateway>,
    ) -> Self {
        Self {
            config,
            db,
            jwt_service,
            sessions,
            payments,
        }
    }

    /// 初始化服务器状态
    ///
    /// 按顺序初始化：
    /// 1. 工作目录结构
    /// 2. 数据库 (work_dir/database/reef.db)
    /// 3. JWT、会话存储、支付服务
    ///
    /// # Panics
    ///
    /// 数据库初始化失败时 panic
    pub async fn initialize(config: &Config) -> Self {
        config
            .ensure_work_dir_structure()
            .expect("Failed to create work directory structure");

        let db_path = config.database_dir().join("reef.db");
        let db_service = DbService::new(&db_path.to_string_lossy())
            .await
            .expect("Failed to initialize database");

        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));
        let sessions = SessionStore::new();
        let payments: Arc<dyn PaymentGateway> =
            Arc::new(RedirectGateway::new(config.payment_redirect_base.clone()));

        Self::new(config.clone(), db_service.db, jwt_service, sessions, payments)
    }

    /// 获取数据库实例
    pub fn get_db(&self) -> Surreal<Db> {
        self.db.clone()
    }

    /// 获取 JWT 服务
    pub fn get_jwt_service(&self) -> Arc<JwtService> {
        self.jwt_service.clone()
    }
}
