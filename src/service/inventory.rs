use crate::db::queries_inventory;
use crate::error::{AppError, Operation, StorageContext};
use crate::models::{
    IntakeCommand, IntakeReceipt, MovementType, WithdrawalCommand, WithdrawalReceipt,
};
use sqlx::PgPool;
use std::future::Future;
use std::time::Duration;

/// 库存入库/出库服务
/// 每个流程在单个事务内按固定顺序执行，任一步失败则整体回滚
pub struct InventoryService {
    pool: PgPool,
    workflow_timeout: Duration,
}

impl InventoryService {
    pub fn new(pool: PgPool, workflow_timeout: Duration) -> Self {
        Self {
            pool,
            workflow_timeout,
        }
    }

    /// 入库: 变动记录 -> 库存累加 -> 产品供应商关联 -> 价格历史
    pub async fn record_intake(&self, cmd: &IntakeCommand) -> Result<IntakeReceipt, AppError> {
        let receipt = self
            .with_deadline(Operation::RecordIntake, self.intake_in_transaction(cmd))
            .await?;

        tracing::info!(
            "Intake recorded: movement {}, product {}, color {:?}, size {:?}, +{} (on hand {})",
            receipt.movement_id,
            cmd.key.product_id,
            cmd.key.color_id,
            cmd.key.size_id,
            cmd.quantity,
            receipt.quantity_on_hand
        );
        Ok(receipt)
    }

    /// 出库: 变动记录 -> 库存扣减 (库存不足时失败并回滚)
    pub async fn record_withdrawal(
        &self,
        cmd: &WithdrawalCommand,
    ) -> Result<WithdrawalReceipt, AppError> {
        let receipt = self
            .with_deadline(Operation::RecordWithdrawal, self.withdrawal_in_transaction(cmd))
            .await?;

        tracing::info!(
            "Withdrawal recorded: movement {}, product {}, color {:?}, size {:?}, -{} (on hand {})",
            receipt.movement_id,
            cmd.key.product_id,
            cmd.key.color_id,
            cmd.key.size_id,
            cmd.quantity,
            receipt.quantity_on_hand
        );
        Ok(receipt)
    }

    async fn intake_in_transaction(&self, cmd: &IntakeCommand) -> Result<IntakeReceipt, AppError> {
        // 事务未提交即被丢弃时 sqlx 自动回滚
        let mut tx = self.pool.begin().await.during(Operation::BeginTransaction)?;

        // 1. 变动记录
        let movement_id = queries_inventory::insert_movement(
            &mut *tx,
            &cmd.key,
            cmd.quantity,
            cmd.purchase_price.as_ref(),
            MovementType::Intake,
        )
        .await
        .during(Operation::InsertIntakeMovement)?;
        tracing::debug!("intake step 1/4: movement {} inserted", movement_id);

        // 2. 库存累加
        let quantity_on_hand = queries_inventory::upsert_inventory(&mut *tx, &cmd.key, cmd.quantity)
            .await
            .during(Operation::IncrementInventory)?;
        tracing::debug!("intake step 2/4: inventory now {}", quantity_on_hand);

        // 3. 产品-供应商关联
        queries_inventory::insert_product_supplier(&mut *tx, cmd.key.product_id, cmd.supplier_id)
            .await
            .during(Operation::LinkSupplier)?;
        tracing::debug!("intake step 3/4: supplier {} linked", cmd.supplier_id);

        // 4. 价格历史
        let history_id = queries_inventory::insert_price_history(
            &mut *tx,
            cmd.key.product_id,
            cmd.purchase_price.as_ref(),
            cmd.supplier_id,
        )
        .await
        .during(Operation::InsertPriceHistory)?;
        tracing::debug!("intake step 4/4: price history {} inserted", history_id);

        tx.commit().await.during(Operation::CommitTransaction)?;

        Ok(IntakeReceipt {
            movement_id,
            quantity_on_hand,
        })
    }

    async fn withdrawal_in_transaction(
        &self,
        cmd: &WithdrawalCommand,
    ) -> Result<WithdrawalReceipt, AppError> {
        let mut tx = self.pool.begin().await.during(Operation::BeginTransaction)?;

        let movement_id = queries_inventory::insert_movement(
            &mut *tx,
            &cmd.key,
            cmd.quantity,
            None,
            MovementType::Withdrawal,
        )
        .await
        .during(Operation::InsertWithdrawalMovement)?;
        tracing::debug!("withdrawal step 1/2: movement {} inserted", movement_id);

        let decremented = queries_inventory::decrement_inventory(&mut *tx, &cmd.key, cmd.quantity)
            .await
            .during(Operation::DecrementInventory)?;

        let Some(quantity_on_hand) = decremented else {
            let available = queries_inventory::current_quantity(&mut *tx, &cmd.key)
                .await
                .during(Operation::DecrementInventory)?
                .unwrap_or(0);
            // tx 在此处被丢弃，变动记录随之回滚
            return Err(AppError::InsufficientStock {
                product_id: cmd.key.product_id,
                requested: cmd.quantity,
                available,
            });
        };
        tracing::debug!("withdrawal step 2/2: inventory now {}", quantity_on_hand);

        tx.commit().await.during(Operation::CommitTransaction)?;

        Ok(WithdrawalReceipt {
            movement_id,
            quantity_on_hand,
        })
    }

    /// 流程整体超时控制，超时后事务被丢弃并回滚
    async fn with_deadline<T>(
        &self,
        operation: Operation,
        workflow: impl Future<Output = Result<T, AppError>>,
    ) -> Result<T, AppError> {
        match tokio::time::timeout(self.workflow_timeout, workflow).await {
            Ok(result) => result,
            Err(_) => {
                tracing::error!(
                    "✗ {} timed out (>{:?}), transaction rolled back",
                    operation,
                    self.workflow_timeout
                );
                Err(AppError::Timeout { operation })
            }
        }
    }
}
