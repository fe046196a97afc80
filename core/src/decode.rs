//! Typed contract interfaces and selector-based call decoding.
//!
//! The `sol!` macro generates `SolCall` implementations with `SELECTOR`
//! constants for each function, which gives type-safe decoding of call
//! data without carrying JSON ABIs around. The interface set is fixed:
//! the fungible-token, vault and NFT standards plus the two hub-specific
//! surfaces (the Safe wallet itself and the wxHOPR wrapper).

use alloy_sol_types::{sol, SolCall};

sol! {
    interface IERC20 {
        function balanceOf(address account) external view returns (uint256);
        function transfer(address to, uint256 amount) external returns (bool);
        function approve(address spender, uint256 amount) external returns (bool);
        function transferFrom(address from, address to, uint256 amount) external returns (bool);
    }

    interface IERC4626 {
        function deposit(uint256 assets, address receiver) external returns (uint256);
        function mint(uint256 shares, address receiver) external returns (uint256);
        function withdraw(uint256 assets, address receiver, address owner) external returns (uint256);
        function redeem(uint256 shares, address receiver, address owner) external returns (uint256);
    }

    interface IERC721 {
        function setApprovalForAll(address operator, bool approved) external;
        function safeTransferFrom(address from, address to, uint256 tokenId) external;
        function safeTransferFrom(address from, address to, uint256 tokenId, bytes data) external;
    }

    interface ISafe {
        function execTransaction(
            address to,
            uint256 value,
            bytes calldata data,
            uint8 operation,
            uint256 safeTxGas,
            uint256 baseGas,
            uint256 gasPrice,
            address gasToken,
            address refundReceiver,
            bytes calldata signatures
        ) external payable returns (bool success);

        function addOwnerWithThreshold(address owner, uint256 _threshold) external;
        function removeOwner(address prevOwner, address owner, uint256 _threshold) external;
        function swapOwner(address prevOwner, address oldOwner, address newOwner) external;
        function changeThreshold(uint256 _threshold) external;
        function enableModule(address module) external;
        function disableModule(address prevModule, address module) external;
        function setGuard(address guard) external;
    }

    interface IWrapper {
        function transferAndCall(address recipient, uint256 amount, bytes data) external returns (bool);
        function onTokenTransfer(address from, uint256 amount, bytes data) external returns (bool);
    }

    interface IErc1820Registry {
        function setInterfaceImplementer(address account, bytes32 interfaceHash, address implementer) external;
    }

    interface INodeManagementModule {
        function includeNode(uint256 nodeDefaultTarget) external;
        function scopeTargetToken(uint256 defaultTarget) external;
        function tryGetTarget(address targetAddress) external view returns (bool, uint256);
        function isNode(address nodeAddress) external view returns (bool);
    }

    interface INodeSafeRegistry {
        function nodeToSafe(address nodeAddress) external view returns (address);
        function registerSafeByNode(address safeAddress) external;
    }

    interface IMultiSend {
        function multiSend(bytes transactions) external payable;
    }
}

/// Decodes call data against the known interface set, returning the
/// function name when both the selector and the parameters decode.
pub fn decode_known_call(data: &[u8]) -> Option<&'static str> {
    if data.len() < 4 {
        return None;
    }
    let selector: [u8; 4] = data[0..4].try_into().ok()?;

    // approve/transferFrom selectors are shared between ERC-20 and
    // ERC-721; the ERC-20 arms cover both.
    match selector {
        IERC20::transferCall::SELECTOR => {
            IERC20::transferCall::abi_decode(data).ok().map(|_| "transfer")
        }
        IERC20::approveCall::SELECTOR => {
            IERC20::approveCall::abi_decode(data).ok().map(|_| "approve")
        }
        IERC20::transferFromCall::SELECTOR => IERC20::transferFromCall::abi_decode(data)
            .ok()
            .map(|_| "transferFrom"),
        IERC4626::depositCall::SELECTOR => {
            IERC4626::depositCall::abi_decode(data).ok().map(|_| "deposit")
        }
        IERC4626::mintCall::SELECTOR => {
            IERC4626::mintCall::abi_decode(data).ok().map(|_| "mint")
        }
        IERC4626::withdrawCall::SELECTOR => {
            IERC4626::withdrawCall::abi_decode(data).ok().map(|_| "withdraw")
        }
        IERC4626::redeemCall::SELECTOR => {
            IERC4626::redeemCall::abi_decode(data).ok().map(|_| "redeem")
        }
        IERC721::setApprovalForAllCall::SELECTOR => IERC721::setApprovalForAllCall::abi_decode(data)
            .ok()
            .map(|_| "setApprovalForAll"),
        IERC721::safeTransferFrom_0Call::SELECTOR => {
            IERC721::safeTransferFrom_0Call::abi_decode(data)
                .ok()
                .map(|_| "safeTransferFrom")
        }
        IERC721::safeTransferFrom_1Call::SELECTOR => {
            IERC721::safeTransferFrom_1Call::abi_decode(data)
                .ok()
                .map(|_| "safeTransferFrom")
        }
        ISafe::execTransactionCall::SELECTOR => ISafe::execTransactionCall::abi_decode(data)
            .ok()
            .map(|_| "execTransaction"),
        ISafe::addOwnerWithThresholdCall::SELECTOR => {
            ISafe::addOwnerWithThresholdCall::abi_decode(data)
                .ok()
                .map(|_| "addOwnerWithThreshold")
        }
        ISafe::removeOwnerCall::SELECTOR => {
            ISafe::removeOwnerCall::abi_decode(data).ok().map(|_| "removeOwner")
        }
        ISafe::swapOwnerCall::SELECTOR => {
            ISafe::swapOwnerCall::abi_decode(data).ok().map(|_| "swapOwner")
        }
        ISafe::changeThresholdCall::SELECTOR => ISafe::changeThresholdCall::abi_decode(data)
            .ok()
            .map(|_| "changeThreshold"),
        ISafe::enableModuleCall::SELECTOR => {
            ISafe::enableModuleCall::abi_decode(data).ok().map(|_| "enableModule")
        }
        ISafe::disableModuleCall::SELECTOR => ISafe::disableModuleCall::abi_decode(data)
            .ok()
            .map(|_| "disableModule"),
        ISafe::setGuardCall::SELECTOR => {
            ISafe::setGuardCall::abi_decode(data).ok().map(|_| "setGuard")
        }
        IWrapper::transferAndCallCall::SELECTOR => IWrapper::transferAndCallCall::abi_decode(data)
            .ok()
            .map(|_| "transferAndCall"),
        IWrapper::onTokenTransferCall::SELECTOR => IWrapper::onTokenTransferCall::abi_decode(data)
            .ok()
            .map(|_| "onTokenTransfer"),
        IErc1820Registry::setInterfaceImplementerCall::SELECTOR => {
            IErc1820Registry::setInterfaceImplementerCall::abi_decode(data)
                .ok()
                .map(|_| "setInterfaceImplementer")
        }
        IMultiSend::multiSendCall::SELECTOR => IMultiSend::multiSendCall::abi_decode(data)
            .ok()
            .map(|_| "multiSend"),
        INodeManagementModule::includeNodeCall::SELECTOR => {
            INodeManagementModule::includeNodeCall::abi_decode(data)
                .ok()
                .map(|_| "includeNode")
        }
        _ => None,
    }
}
