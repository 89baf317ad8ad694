// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Payroll contract ABI and response decoding.

use alloy::{
    primitives::{Address, U256},
    sol,
};

use crate::models::LedgerRecord;

// Define the payroll contract interface using alloy's sol! macro
sol! {
    #[sol(rpc)]
    interface IPayrollLedger {
        function getAllBusinessIds() external view returns (string[] memory);
        function getBusinessData(string calldata businessId) external view returns (
            string memory name,
            uint256 publicValue1,
            uint256 publicValue2,
            string memory description,
            address creator,
            uint256 timestamp,
            bool isVerified,
            uint32 decryptedValue
        );
        function getEncryptedValue(string calldata businessId) external view returns (bytes32);
        function createBusinessData(
            string calldata businessId,
            string calldata name,
            bytes32 encryptedValue,
            bytes calldata inputProof,
            uint256 publicValue1,
            uint256 publicValue2,
            string calldata description
        ) external;
        function verifyDecryption(
            string calldata businessId,
            bytes memory abiEncodedClearValue,
            bytes memory decryptionProof
        ) external;
        function isAvailable() external view returns (bool);
    }
}

/// Narrow a contract integer to `u64`, defaulting to `0` when it overflows.
pub fn u256_or_zero(value: U256) -> u64 {
    u64::try_from(value).unwrap_or(0)
}

/// Decode the tuple returned by `getBusinessData`.
pub fn decode_business_data(data: IPayrollLedger::getBusinessDataReturn) -> LedgerRecord {
    LedgerRecord {
        name: data.name,
        public_hours: u256_or_zero(data.publicValue1),
        public_performance: u256_or_zero(data.publicValue2),
        description: data.description,
        timestamp: u256_or_zero(data.timestamp),
        creator: format_address(data.creator),
        verified: data.isVerified,
        decrypted_value: u64::from(data.decryptedValue),
    }
}

/// Checksummed address string.
pub fn format_address(address: Address) -> String {
    address.to_checksum(None)
}
