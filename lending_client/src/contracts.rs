use alloy::sol;

// Lending Pool Contract
sol!(
    #[allow(missing_docs)]
    #[sol(rpc, extra_methods)]
    #[derive(Debug)]
    contract LendingPool {
        function getAssetValueInUSD(address token, uint256 amount) external view returns (uint256);
        function collateralDeposited(address user, address token) external view returns (uint256);
        function getUserTotalBorrowed(address user) external view returns (uint256);
        function getUserTotalCollateral(address user) external view returns (uint256);
        function allowedBorrowingAmount(address user) external view returns (uint256);
        function userHealthFactor(address user) external view returns (uint256);
        function totalLiquidity(address token) external view returns (uint256);
        function calculateBasicLPRewards(address provider) external view returns (uint256);
        function getLiquidityPool(address provider, address token)
            external
            view
            returns (uint256 amount, uint256 withdrawalTime, uint256 addedAt);
        function treasury() external view returns (address);
        function getTotalValueLocked(address token) external view returns (uint256);
        function priceFeeds(address token) external view returns (address);
        function checkForBrokenHealthFactor(address user) external view;

        function depositCollateral(address token, uint256 amount) external;
        function borrowAsset(address token, uint256 amount) external;
        function withdrawCollateralDeposited(address token, uint256 amount) external;
        function repayLoan(address token, uint256 amount) external;
        function liquidatePosition(address user, address token, uint256 debtToCover) external;
        function addLiquidity(address token, uint256 amount) external;
        function withdrawFromLiquidityPool(address token, uint256 amount) external;
        function rebalancePortfolio() external;
        function transferOwnership(address newOwner) external;
        function acceptOwnership() external;

        event CollateralDeposited(address indexed user, address indexed token, uint256 amount, uint256 timeStamp);
        event AssetBorrowed(address indexed user, address indexed token, uint256 amount, uint256 timeStamp);
        event LoanRepayed(address indexed user, address indexed token, uint256 amount, uint256 timeStamp);
        event CollateralWithdrawn(address indexed user, address indexed token, uint256 amount, uint256 timeStamp);
        event PositionLiquidated(address indexed user, address indexed token, uint256 amount, uint256 timeStamp);
        event LiquidityAdded(address indexed provider, address indexed token, uint256 amount, uint256 timeStamp);
        event LiquidityWithdrawn(address indexed provider, address indexed token, uint256 amount, uint256 timeStamp);
    }
);
