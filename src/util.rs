use std::sync::{atomic::AtomicBool, Arc};

use fractic_server_error::ServerError;

use crate::{
    domain::{
        repositories::backend::DataSource,
        usecases::{
            document_usecase::{DocumentUsecase as _, DocumentUsecaseImpl},
            opening_balance_usecase::{OpeningBalanceUsecase as _, OpeningBalanceUsecaseImpl},
            settlement_usecase::{SettlementUsecase as _, SettlementUsecaseImpl},
            vat_change_usecase::{VatChangeUsecase as _, VatChangeUsecaseImpl},
        },
    },
    entities::LedgerContext,
    errors::NoOpenPeriod,
    logic::VoucherEditor,
    usecases::{NumberCheck, SaveOutcome, VatChangeRule, VatSettlement},
};

/// Facade bundling the engine's operations behind one handle. A caller
/// constructs it once over a backend and works through it; the finer-grained
/// usecase traits remain available for callers that only need a slice.
pub struct Bookkeeper<D: DataSource> {
    datasource: Arc<D>,
    document_usecase: DocumentUsecaseImpl<D>,
    settlement_usecase: SettlementUsecaseImpl<D>,
    opening_balance_usecase: OpeningBalanceUsecaseImpl<D>,
    vat_change_usecase: VatChangeUsecaseImpl<D>,
}

impl<D: DataSource> Bookkeeper<D> {
    pub fn new(datasource: Arc<D>) -> Self {
        Self {
            document_usecase: DocumentUsecaseImpl::new(Arc::clone(&datasource)),
            settlement_usecase: SettlementUsecaseImpl::new(Arc::clone(&datasource)),
            opening_balance_usecase: OpeningBalanceUsecaseImpl::new(Arc::clone(&datasource)),
            vat_change_usecase: VatChangeUsecaseImpl::new(Arc::clone(&datasource)),
            datasource,
        }
    }

    /// Builds the editing context: the active fiscal period (the latest one
    /// not yet locked) together with the chart of accounts, document types
    /// and settings.
    pub fn load_context(&self) -> Result<LedgerContext, ServerError> {
        let mut session = self.datasource.open_session()?;
        let period = session
            .periods()?
            .into_iter()
            .filter(|p| !p.locked)
            .last()
            .ok_or_else(|| NoOpenPeriod::new())?;
        let settings = session.settings()?;
        let accounts = session.accounts()?;
        let document_types = session.document_types()?;
        Ok(LedgerContext::new(period, settings, accounts, document_types))
    }

    pub async fn create_document(
        &self,
        ctx: &LedgerContext,
    ) -> Result<VoucherEditor, ServerError> {
        self.document_usecase.create_document(ctx).await
    }

    pub async fn open_document(&self, document_id: i32) -> Result<VoucherEditor, ServerError> {
        self.document_usecase.open_document(document_id).await
    }

    pub async fn save_document(
        &self,
        editor: &mut VoucherEditor,
        ctx: &LedgerContext,
    ) -> Result<SaveOutcome, ServerError> {
        self.document_usecase.save_document(editor, ctx).await
    }

    pub async fn delete_document(&self, editor: &VoucherEditor) -> Result<(), ServerError> {
        self.document_usecase.delete_document(editor).await
    }

    pub async fn check_document_number(
        &self,
        editor: &VoucherEditor,
        ctx: &LedgerContext,
        number: i32,
    ) -> Result<NumberCheck, ServerError> {
        self.document_usecase
            .check_document_number(editor, ctx, number)
            .await
    }

    pub async fn create_settlement_voucher(
        &self,
        ctx: &LedgerContext,
    ) -> Result<VatSettlement, ServerError> {
        self.settlement_usecase.create_settlement_voucher(ctx).await
    }

    pub async fn create_opening_balance_voucher(
        &self,
        ctx: &LedgerContext,
    ) -> Result<Option<VoucherEditor>, ServerError> {
        self.opening_balance_usecase
            .create_opening_balance_voucher(ctx)
            .await
    }

    pub async fn apply_vat_rate_changes(
        &self,
        rules: &[VatChangeRule],
        cancel: &AtomicBool,
    ) -> Result<Option<usize>, ServerError> {
        self.vat_change_usecase.apply_rate_changes(rules, cancel).await
    }
}
