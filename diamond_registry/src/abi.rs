//! Solidity ABI of the registry-management facets (EIP-2535, ERC-165, ERC-173)
//! and of the deployment initializer.

use alloy_sol_types::sol;

sol!(
    // IDiamondCut
    // `action` is the `FacetCutAction` enum, which the ABI encodes as a uint8.
    #[derive(Debug, PartialEq, Eq)]
    struct FacetCut {
        address facetAddress;
        uint8 action;
        bytes4[] functionSelectors;
    }

    function diamondCut(FacetCut[] _diamondCut, address _init, bytes _calldata) external;

    // IDiamondLoupe
    #[derive(Debug, PartialEq, Eq)]
    struct Facet {
        address facetAddress;
        bytes4[] functionSelectors;
    }

    function facets() external view returns (Facet[] facets_);
    function facetFunctionSelectors(address _facet) external view returns (bytes4[] facetFunctionSelectors_);
    function facetAddresses() external view returns (address[] facetAddresses_);
    function facetAddress(bytes4 _functionSelector) external view returns (address facetAddress_);

    // IERC165
    function supportsInterface(bytes4 _interfaceId) external view returns (bool);

    // IERC173
    function owner() external view returns (address owner_);
    function transferOwnership(address _newOwner) external;

    // DiamondInit
    function init(
        address pool,
        uint256 protocolFee,
        uint256 maxTotalSupply,
        int24 baseThreshold,
        int24 limitThreshold,
        uint256 period,
        int24 minTickMove,
        int24 maxTwapDeviation,
        uint32 twapDuration,
        address keeper
    ) external;
);
