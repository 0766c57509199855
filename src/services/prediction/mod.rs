//! 预测 API 抽象
//!
//! `PredictionApi` 是生成服务与托管模型之间的边界，生产环境使用
//! [`ReplicateClient`]，测试中替换为脚本化实现。

mod replicate;
mod types;

use async_trait::async_trait;

pub use replicate::ReplicateClient;
pub use types::{
    GeneratedImage, Prediction, PredictionInput, PredictionRequest, PredictionStatus,
    PredictionUrls,
};

use crate::errors::Result;

#[async_trait]
pub trait PredictionApi: Send + Sync {
    /// 是否已配置 API 密钥
    fn is_configured(&self) -> bool;

    /// 提交预测任务
    async fn create(&self, request: &PredictionRequest) -> Result<Prediction>;

    /// 查询任务状态（`urls.get`）
    async fn fetch(&self, url: &str) -> Result<Prediction>;
}
