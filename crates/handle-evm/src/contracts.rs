use alloy::sol;

sol! {
    /// Handle treasury: holds vault balances and emits the vault events.
    interface ITreasury {
        event UpdateDebt(address indexed account, address indexed fxToken);
        event UpdateCollateral(
            address indexed account,
            address indexed fxToken,
            address indexed collateralToken
        );

        function vaultLibrary() external view returns (address);
        function getDebt(address account, address fxToken) external view returns (uint256);
        function getTotalCollateralBalanceAsEth(address account, address fxToken)
            external
            view
            returns (uint256);
    }

    /// Ratio helpers, resolved through `ITreasury.vaultLibrary()`.
    interface IVaultLibrary {
        function getCurrentRatio(address account, address fxToken) external view returns (uint256);
        function getVaultMinimumRatio(address account, address fxToken)
            external
            view
            returns (uint256);
    }
}
