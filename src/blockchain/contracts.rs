//! Contract ABIs used by the client.
//!
//! Only the functions and events actually called or consumed are declared.

use alloy::sol;

sol! {
    /// Oracle contract of the Functions network.
    #[derive(Debug)]
    interface FunctionsOracle {
        function getDONPublicKey() external view returns (bytes memory);
        function getAllNodePublicKeys() external view returns (address[] memory nodes, bytes[] memory publicKeys);

        /// Emitted when the consumer's fulfillment handler reverted with a reason.
        event UserCallbackError(bytes32 indexed requestId, string reason);

        /// Emitted when the consumer's fulfillment handler reverted without a decodable reason.
        event UserCallbackRawError(bytes32 indexed requestId, bytes lowLevelData);
    }

    /// Review consumer contract issuing Functions requests.
    #[derive(Debug)]
    interface ReviewConsumer {
        function addReview(
            uint256 restaurantId,
            string calldata reviewText,
            string calldata source,
            bytes calldata secrets,
            uint64 subscriptionId,
            uint32 gasLimit
        ) external returns (bytes32 requestId);

        event RequestSent(bytes32 indexed id);

        /// Emitted by the fulfillment callback with the oracle's answer.
        event AIReviewResponse(bytes32 indexed requestId, bytes result, bytes err);
    }

    /// ERC-677 LINK token.
    #[derive(Debug)]
    interface LinkToken {
        function balanceOf(address owner) external view returns (uint256 balance);
        function transferAndCall(address to, uint256 value, bytes calldata data) external returns (bool success);
    }

    /// Functions billing registry.
    #[derive(Debug)]
    interface FunctionsBillingRegistry {
        function addConsumer(uint64 subscriptionId, address consumer) external;
    }
}
