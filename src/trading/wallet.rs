//! 钱包签名 / 广播的外部接口
//!
//! 助记词派生、签名与 seqno 管理由外部实现负责，这里只约定接口。

use anyhow::Result;
use async_trait::async_trait;

use super::transaction_builder::TransactionParams;

#[async_trait]
pub trait TransactionSender: Send + Sync {
    /// 调用方自己的钱包地址（non-bounceable user-friendly 格式）
    async fn address(&self) -> Result<String>;

    /// 签名并广播，返回交易 hash
    async fn send_transaction(&self, params: &TransactionParams) -> Result<String>;
}
