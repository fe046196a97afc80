//! Calldata builders for the hub's known transaction flows.
//!
//! The same builders serve two purposes: the proposal endpoints use them
//! to construct transactions for the wallet to sign, and classification
//! uses [`node_config`] to reconstruct the expected module-configuration
//! payload and compare it byte-for-byte against a pending transaction.
//! That comparison is a versioned contract with the on-chain module
//! layout; the tests below pin it.

use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::SolCall;

use crate::config::Addresses;
use crate::decode::{IErc1820Registry, IMultiSend, INodeManagementModule, IWrapper, IERC20};

/// Default capability permission byte-pack for a node target.
///
/// A module target packs an address in the high 160 bits and twelve
/// permission bytes in the low 96: clearance, target type, the default
/// target permission and nine per-capability permissions.
const NODE_TARGET_PERMISSIONS: u128 = 0x0101_0303_0303_0303_0303_0303;

/// Permission pack for the announcement contract target.
const ANNOUNCEMENT_TARGET_PERMISSIONS: u128 = 0x0102_0101_0101_0101_0101_0101;

/// Packs an address and a permission set into a module target word.
pub fn capability_target(address: Address, permissions: u128) -> U256 {
    (U256::from_be_slice(address.as_slice()) << 96) | U256::from(permissions)
}

/// Call data wrapping xHOPR into wxHOPR: `transferAndCall` on the xHOPR
/// token, sending `amount` to the wrapper with no extra data.
pub fn wrap(book: &Addresses, amount: U256) -> Bytes {
    IWrapper::transferAndCallCall {
        recipient: book.wxhopr_wrapper,
        amount,
        data: Bytes::new(),
    }
    .abi_encode()
    .into()
}

/// Call data unwrapping wxHOPR back to xHOPR: a plain `transfer` of the
/// wrapped token to the wrapper contract.
pub fn unwrap(book: &Addresses, amount: U256) -> Bytes {
    IERC20::transferCall {
        to: book.wxhopr_wrapper,
        amount,
    }
    .abi_encode()
    .into()
}

/// Call data registering the safe's ERC-777 recipient interface in the
/// ERC-1820 registry.
pub fn register_erc1820(book: &Addresses, safe: Address) -> Bytes {
    IErc1820Registry::setInterfaceImplementerCall {
        account: safe,
        interfaceHash: book.erc1820_interface_hash,
        implementer: book.erc1820_implementer,
    }
    .abi_encode()
    .into()
}

/// The module-configuration payload proposed during node onboarding.
///
/// A `multiSend` batch of two calls on the management module: include the
/// node with its default capability permissions, then scope the
/// announcement contract as a token target. The byte layout is pinned by
/// tests; any change here is a breaking change for classification of
/// in-flight proposals.
pub fn node_config(module: Address, node: Address, announcement: Address) -> Bytes {
    let include = INodeManagementModule::includeNodeCall {
        nodeDefaultTarget: capability_target(node, NODE_TARGET_PERMISSIONS),
    }
    .abi_encode();
    let scope = INodeManagementModule::scopeTargetTokenCall {
        defaultTarget: capability_target(announcement, ANNOUNCEMENT_TARGET_PERMISSIONS),
    }
    .abi_encode();

    let mut batch = Vec::with_capacity(2 * (1 + 20 + 32 + 32) + include.len() + scope.len());
    pack_multisend_call(&mut batch, module, &include);
    pack_multisend_call(&mut batch, module, &scope);

    IMultiSend::multiSendCall {
        transactions: batch.into(),
    }
    .abi_encode()
    .into()
}

/// Appends one inner call in MultiSend packing: operation byte, target
/// address, 32-byte value, 32-byte data length, data.
fn pack_multisend_call(out: &mut Vec<u8>, to: Address, data: &[u8]) {
    out.push(0u8); // CALL
    out.extend_from_slice(to.as_slice());
    out.extend_from_slice(&U256::ZERO.to_be_bytes::<32>());
    out.extend_from_slice(&U256::from(data.len()).to_be_bytes::<32>());
    out.extend_from_slice(data);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::decode_known_call;
    use pretty_assertions::assert_eq;

    fn book() -> Addresses {
        Addresses::default()
    }

    fn node() -> Address {
        "0x9090909090909090909090909090909090909090".parse().unwrap()
    }

    #[test]
    fn wrap_encodes_transfer_and_call_to_wrapper() {
        let data = wrap(&book(), U256::from(1_000u64));
        assert_eq!(decode_known_call(&data), Some("transferAndCall"));

        let call = IWrapper::transferAndCallCall::abi_decode(&data).unwrap();
        assert_eq!(call.recipient, book().wxhopr_wrapper);
        assert_eq!(call.amount, U256::from(1_000u64));
        assert!(call.data.is_empty());
    }

    #[test]
    fn unwrap_encodes_plain_transfer_to_wrapper() {
        let data = unwrap(&book(), U256::from(5u64));
        let call = IERC20::transferCall::abi_decode(&data).unwrap();
        assert_eq!(call.to, book().wxhopr_wrapper);
        assert_eq!(call.amount, U256::from(5u64));
    }

    #[test]
    fn capability_target_keeps_address_in_high_bits() {
        let target = capability_target(node(), NODE_TARGET_PERMISSIONS);
        let recovered = Address::from_slice(&(target >> 96usize).to_be_bytes::<32>()[12..]);
        assert_eq!(recovered, node());
        assert_eq!(target & U256::from(u128::MAX >> 32), U256::from(NODE_TARGET_PERMISSIONS));
    }

    #[test]
    fn node_config_is_a_multisend_of_two_module_calls() {
        let b = book();
        let data = node_config(b.node_management_module, node(), b.announcement);

        let call = IMultiSend::multiSendCall::abi_decode(&data).unwrap();
        let batch = call.transactions.as_ref();

        // First packed call: op byte, module address, zero value, then
        // the includeNode call for this node.
        assert_eq!(batch[0], 0);
        assert_eq!(&batch[1..21], b.node_management_module.as_slice());
        let len1 = U256::from_be_slice(&batch[53..85]).to::<usize>();
        let inner1 = &batch[85..85 + len1];
        let include = INodeManagementModule::includeNodeCall::abi_decode(inner1).unwrap();
        assert_eq!(
            include.nodeDefaultTarget,
            capability_target(node(), NODE_TARGET_PERMISSIONS)
        );

        // Second packed call is the announcement scoping.
        let rest = &batch[85 + len1..];
        assert_eq!(rest[0], 0);
        assert_eq!(&rest[1..21], b.node_management_module.as_slice());
    }

    #[test]
    fn node_config_is_deterministic() {
        let b = book();
        let first = node_config(b.node_management_module, node(), b.announcement);
        let second = node_config(b.node_management_module, node(), b.announcement);
        assert_eq!(first, second);

        let other: Address = "0x8080808080808080808080808080808080808080".parse().unwrap();
        assert_ne!(first, node_config(b.node_management_module, other, b.announcement));
    }
}
