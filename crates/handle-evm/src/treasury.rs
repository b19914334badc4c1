use alloy::{
    network::TransactionBuilder,
    providers::{Provider, RootProvider},
    rpc::types::TransactionRequest,
    sol_types::SolCall,
    transports::TransportError,
};
use handle_vaults::{Address, ReadContext, SourceError, U256, VaultSource};

use crate::{
    contracts::{ITreasury, IVaultLibrary},
    provider::block_id,
};

/// JSON-RPC error code used by geth-compatible nodes for execution reverts.
const EXECUTION_REVERTED: i64 = 3;

fn method_name(signature: &'static str) -> &'static str {
    signature.split('(').next().unwrap_or(signature)
}

fn is_revert(error: &TransportError) -> bool {
    error.as_error_resp().is_some_and(|payload| {
        payload.code == EXECUTION_REVERTED || payload.message.to_lowercase().contains("revert")
    })
}

fn transport_to_source_error(
    signature: &'static str,
    contract: Address,
    error: &TransportError,
) -> SourceError {
    let method = method_name(signature);
    let message = error.to_string();
    if is_revert(error) {
        SourceError::Reverted {
            method,
            contract,
            message,
        }
    } else {
        SourceError::Unavailable {
            method,
            contract,
            message,
        }
    }
}

/// Reads vault figures from the treasury and its vault library with `eth_call`.
#[derive(Clone)]
pub struct EvmVaultSource {
    provider: RootProvider,
}

impl EvmVaultSource {
    pub const fn new(provider: RootProvider) -> Self {
        Self { provider }
    }

    async fn call<C: SolCall>(
        &self,
        context: ReadContext,
        call: C,
    ) -> Result<C::Return, SourceError> {
        let request = TransactionRequest::default()
            .with_to(context.contract)
            .with_input(call.abi_encode());

        let output = self
            .provider
            .call(request)
            .block(block_id(context.block))
            .await
            .map_err(|e| transport_to_source_error(C::SIGNATURE, context.contract, &e))?;

        C::abi_decode_returns(&output).map_err(|e| SourceError::Decode {
            method: method_name(C::SIGNATURE),
            contract: context.contract,
            message: e.to_string(),
        })
    }
}

#[async_trait::async_trait]
impl VaultSource for EvmVaultSource {
    async fn vault_library(&self, treasury: ReadContext) -> Result<Address, SourceError> {
        self.call(treasury, ITreasury::vaultLibraryCall {}).await
    }

    async fn get_debt(
        &self,
        treasury: ReadContext,
        account: Address,
        fx_token: Address,
    ) -> Result<U256, SourceError> {
        self.call(
            treasury,
            ITreasury::getDebtCall {
                account,
                fxToken: fx_token,
            },
        )
        .await
    }

    async fn get_total_collateral_balance_as_eth(
        &self,
        treasury: ReadContext,
        account: Address,
        fx_token: Address,
    ) -> Result<U256, SourceError> {
        self.call(
            treasury,
            ITreasury::getTotalCollateralBalanceAsEthCall {
                account,
                fxToken: fx_token,
            },
        )
        .await
    }

    async fn get_current_ratio(
        &self,
        library: ReadContext,
        account: Address,
        fx_token: Address,
    ) -> Result<U256, SourceError> {
        self.call(
            library,
            IVaultLibrary::getCurrentRatioCall {
                account,
                fxToken: fx_token,
            },
        )
        .await
    }

    async fn get_vault_minimum_ratio(
        &self,
        library: ReadContext,
        account: Address,
        fx_token: Address,
    ) -> Result<U256, SourceError> {
        self.call(
            library,
            IVaultLibrary::getVaultMinimumRatioCall {
                account,
                fxToken: fx_token,
            },
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use alloy::{rpc::json_rpc::ErrorPayload, transports::TransportErrorKind};

    use super::*;

    #[test]
    fn test_method_name() {
        assert_eq!(method_name(ITreasury::getDebtCall::SIGNATURE), "getDebt");
        assert_eq!(method_name(ITreasury::vaultLibraryCall::SIGNATURE), "vaultLibrary");
    }

    #[test]
    fn test_call_encoding_pads_addresses() {
        let account = Address::repeat_byte(0xaa);
        let fx_token = Address::repeat_byte(0xbb);
        let data = ITreasury::getDebtCall {
            account,
            fxToken: fx_token,
        }
        .abi_encode();

        assert_eq!(data.len(), 4 + 64);
        assert_eq!(&data[..4], &ITreasury::getDebtCall::SELECTOR);
        assert_eq!(&data[4..16], &[0u8; 12]);
        assert_eq!(&data[16..36], account.as_slice());
        assert_eq!(&data[48..68], fx_token.as_slice());
    }

    #[test]
    fn test_return_decoding() {
        let ratio = U256::from(300u64);
        let word = ratio.to_be_bytes::<32>();
        assert_eq!(
            IVaultLibrary::getCurrentRatioCall::abi_decode_returns(&word).unwrap(),
            ratio
        );

        let library = Address::repeat_byte(0x42);
        let word = library.into_word();
        assert_eq!(
            ITreasury::vaultLibraryCall::abi_decode_returns(word.as_slice()).unwrap(),
            library
        );

        assert!(ITreasury::getDebtCall::abi_decode_returns(&[]).is_err());
    }

    #[test]
    fn test_revert_maps_to_reverted() {
        let contract = Address::repeat_byte(9);
        let error = TransportError::ErrorResp(ErrorPayload {
            code: 3,
            message: "execution reverted".into(),
            data: None,
        });

        assert!(matches!(
            transport_to_source_error(IVaultLibrary::getCurrentRatioCall::SIGNATURE, contract, &error),
            SourceError::Reverted { method: "getCurrentRatio", contract: c, .. } if c == contract
        ));
    }

    #[test]
    fn test_legacy_revert_message_maps_to_reverted() {
        let error = TransportError::ErrorResp(ErrorPayload {
            code: -32000,
            message: "VM Exception while processing transaction: revert".into(),
            data: None,
        });
        assert!(is_revert(&error));

        let rate_limited = TransportError::ErrorResp(ErrorPayload {
            code: -32005,
            message: "limit exceeded".into(),
            data: None,
        });
        assert!(!is_revert(&rate_limited));
    }

    #[test]
    fn test_transport_failure_maps_to_unavailable() {
        let error = TransportErrorKind::custom_str("connection refused");
        assert!(matches!(
            transport_to_source_error(ITreasury::getDebtCall::SIGNATURE, Address::ZERO, &error),
            SourceError::Unavailable {
                method: "getDebt",
                ..
            }
        ));
    }
}
