//! Unit tests for the registry crate

#[cfg(test)]
mod support {
    use std::collections::{HashMap, HashSet};
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use kernel::primitives::{Address, Hash32};

    use crate::domain::entities::{
        Certificate, InstituteRequest, IssueCertificate, IssuedCertificate, RegistrationForm,
        TransactionReceipt,
    };
    use crate::domain::events::{InstituteLog, LogPosition, RequestedLog};
    use crate::domain::repository::{
        ChainReader, ChainWriter, LogRange, TransactionRequest, TransactionSigner,
    };
    use crate::error::{ChainReadError, ChainReadResult, ChainWriteResult};

    pub fn addr(byte: u8) -> Address {
        Address::from_bytes([byte; 20])
    }

    pub fn request(byte: u8) -> InstituteRequest {
        InstituteRequest {
            address: addr(byte),
            name: format!("Institute {}", byte),
            acronym: format!("I{}", byte),
            website: format!("https://i{}.example", byte),
            exists: true,
        }
    }

    pub fn certificate(hash: Hash32, issuer: Address) -> Certificate {
        Certificate {
            hash,
            issuer: Some(issuer),
            institute_name: "Institute of Testing".into(),
            department: "CS".into(),
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            certificant_id: "S-1".into(),
            email: "ada@example.com".into(),
            course: "Engines".into(),
            completion_timestamp: 1_700_000_000,
            notes: String::new(),
            ipfs_hash: "QmHash".into(),
            is_valid: true,
        }
    }

    fn in_range(position: &LogPosition, range: &LogRange) -> bool {
        position.block_number >= range.from_block
            && range.to_block.is_none_or(|to| position.block_number <= to)
    }

    #[derive(Default)]
    pub struct ChainState {
        pub owner: Address,
        pub head: u64,
        pub requested: Vec<RequestedLog>,
        pub registered_logs: Vec<InstituteLog>,
        pub rejected_logs: Vec<InstituteLog>,
        pub registered: HashSet<Address>,
        pub pending: HashMap<Address, InstituteRequest>,
        /// Report `exists == true` but vanish on the display lookup
        pub vanishing: HashSet<Address>,
        /// Fail the existence lookup for this address
        pub failing: Option<Address>,
        pub certificates: HashMap<Hash32, Certificate>,
    }

    /// In-memory chain that counts every read
    #[derive(Default)]
    pub struct FakeChain {
        pub state: Mutex<ChainState>,
        pub reads: AtomicUsize,
        pub fail_reads: AtomicBool,
        pub writes: Mutex<Vec<String>>,
    }

    impl FakeChain {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_state(build: impl FnOnce(&mut ChainState)) -> Self {
            let chain = Self::new();
            build(&mut chain.state.lock().unwrap());
            chain
        }

        /// Record a registration request log and a live pending record
        pub fn request(state: &mut ChainState, byte: u8) {
            state.head += 1;
            state.requested.push(RequestedLog {
                institute: addr(byte),
                name: format!("Institute {}", byte),
                position: LogPosition {
                    block_number: state.head,
                    log_index: 0,
                },
            });
            state.pending.insert(addr(byte), request(byte));
        }

        pub fn approve(state: &mut ChainState, byte: u8) {
            state.head += 1;
            state.registered_logs.push(InstituteLog {
                institute: addr(byte),
                position: LogPosition {
                    block_number: state.head,
                    log_index: 0,
                },
            });
            state.registered.insert(addr(byte));
            state.pending.remove(&addr(byte));
        }

        pub fn reject(state: &mut ChainState, byte: u8) {
            state.head += 1;
            state.rejected_logs.push(InstituteLog {
                institute: addr(byte),
                position: LogPosition {
                    block_number: state.head,
                    log_index: 0,
                },
            });
            state.pending.remove(&addr(byte));
        }

        pub fn read_count(&self) -> usize {
            self.reads.load(Ordering::SeqCst)
        }

        pub fn write_log(&self) -> Vec<String> {
            self.writes.lock().unwrap().clone()
        }

        fn read(&self) -> ChainReadResult<std::sync::MutexGuard<'_, ChainState>> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            if self.fail_reads.load(Ordering::SeqCst) {
                return Err(ChainReadError::Unreachable("connection refused".into()));
            }
            Ok(self.state.lock().unwrap())
        }

        fn write(&self, call: String) -> TransactionReceipt {
            self.writes.lock().unwrap().push(call);
            TransactionReceipt {
                transaction_hash: Hash32::from_bytes([0x77; 32]),
                block_number: 1,
                status: true,
                logs: vec![],
            }
        }
    }

    impl ChainReader for FakeChain {
        async fn owner(&self) -> ChainReadResult<Address> {
            Ok(self.read()?.owner)
        }

        async fn is_registered(&self, institute: Address) -> ChainReadResult<bool> {
            Ok(self.read()?.registered.contains(&institute))
        }

        async fn pending_exists(&self, institute: Address) -> ChainReadResult<bool> {
            let state = self.read()?;
            if state.failing == Some(institute) {
                return Err(ChainReadError::Timeout);
            }
            Ok(state.pending.contains_key(&institute) || state.vanishing.contains(&institute))
        }

        async fn pending_institute(
            &self,
            institute: Address,
        ) -> ChainReadResult<Option<InstituteRequest>> {
            Ok(self.read()?.pending.get(&institute).cloned())
        }

        async fn certificate(&self, hash: Hash32) -> ChainReadResult<Option<Certificate>> {
            Ok(self.read()?.certificates.get(&hash).cloned())
        }

        async fn verify_certificate(&self, hash: Hash32) -> ChainReadResult<Option<Certificate>> {
            Ok(self
                .read()?
                .certificates
                .get(&hash)
                .cloned()
                .map(|c| Certificate { issuer: None, ..c }))
        }

        async fn requested_events(&self, range: LogRange) -> ChainReadResult<Vec<RequestedLog>> {
            let state = self.read()?;
            Ok(state
                .requested
                .iter()
                .filter(|log| in_range(&log.position, &range))
                .cloned()
                .collect())
        }

        async fn registered_events(&self, range: LogRange) -> ChainReadResult<Vec<InstituteLog>> {
            let state = self.read()?;
            Ok(state
                .registered_logs
                .iter()
                .filter(|log| in_range(&log.position, &range))
                .cloned()
                .collect())
        }

        async fn rejected_events(&self, range: LogRange) -> ChainReadResult<Vec<InstituteLog>> {
            let state = self.read()?;
            Ok(state
                .rejected_logs
                .iter()
                .filter(|log| in_range(&log.position, &range))
                .cloned()
                .collect())
        }

        async fn block_number(&self) -> ChainReadResult<u64> {
            Ok(self.read()?.head)
        }

        async fn transaction_receipt(
            &self,
            _tx_hash: Hash32,
        ) -> ChainReadResult<Option<TransactionReceipt>> {
            let _state = self.read()?;
            Ok(None)
        }
    }

    impl ChainWriter for FakeChain {
        async fn request_registration<S: TransactionSigner + Sync>(
            &self,
            signer: &S,
            form: &RegistrationForm,
        ) -> ChainWriteResult<TransactionReceipt> {
            Ok(self.write(format!("request:{}:{}", signer.account(), form.name)))
        }

        async fn approve_registration<S: TransactionSigner + Sync>(
            &self,
            _signer: &S,
            institute: Address,
        ) -> ChainWriteResult<TransactionReceipt> {
            Ok(self.write(format!("approve:{}", institute)))
        }

        async fn reject_registration<S: TransactionSigner + Sync>(
            &self,
            _signer: &S,
            institute: Address,
        ) -> ChainWriteResult<TransactionReceipt> {
            Ok(self.write(format!("reject:{}", institute)))
        }

        async fn issue_certificate<S: TransactionSigner + Sync>(
            &self,
            _signer: &S,
            input: &IssueCertificate,
        ) -> ChainWriteResult<IssuedCertificate> {
            let receipt = self.write(format!("issue:{}", input.certificant_id));
            Ok(IssuedCertificate {
                certificate_hash: Hash32::from_bytes([0x42; 32]),
                receipt,
            })
        }

        async fn revoke_certificate<S: TransactionSigner + Sync>(
            &self,
            _signer: &S,
            hash: Hash32,
        ) -> ChainWriteResult<TransactionReceipt> {
            Ok(self.write(format!("revoke:{}", hash)))
        }

        async fn update_ipfs_hash<S: TransactionSigner + Sync>(
            &self,
            _signer: &S,
            hash: Hash32,
            ipfs_hash: &str,
        ) -> ChainWriteResult<TransactionReceipt> {
            Ok(self.write(format!("ipfs:{}:{}", hash, ipfs_hash)))
        }
    }

    pub struct FakeSigner(pub Address);

    impl TransactionSigner for FakeSigner {
        fn account(&self) -> Address {
            self.0
        }

        async fn send_transaction(&self, _tx: &TransactionRequest) -> ChainWriteResult<Hash32> {
            Ok(Hash32::from_bytes([0x77; 32]))
        }
    }
}

#[cfg(test)]
mod reconciler_tests {
    use std::collections::HashSet;
    use std::sync::Arc;

    use super::support::*;
    use crate::application::pending_requests::PendingRequestsUseCase;
    use crate::error::ChainReadError;

    fn reconcile(chain: FakeChain) -> (Arc<FakeChain>, PendingRequestsUseCase<FakeChain>) {
        let chain = Arc::new(chain);
        let use_case = PendingRequestsUseCase::new(chain.clone(), 0);
        (chain, use_case)
    }

    #[tokio::test]
    async fn test_requested_minus_registered() {
        let (_, use_case) = reconcile(FakeChain::with_state(|s| {
            FakeChain::request(s, 0xa);
            FakeChain::request(s, 0xb);
            FakeChain::approve(s, 0xa);
        }));

        let pending = use_case.execute().await.unwrap();
        assert_eq!(pending, vec![request(0xb)]);
    }

    #[tokio::test]
    async fn test_rejected_request_is_dropped() {
        let (_, use_case) = reconcile(FakeChain::with_state(|s| {
            FakeChain::request(s, 1);
            FakeChain::request(s, 2);
            FakeChain::reject(s, 1);
        }));

        let pending = use_case.execute().await.unwrap();
        assert_eq!(pending, vec![request(2)]);
    }

    #[tokio::test]
    async fn test_repeated_requests_listed_once_in_discovery_order() {
        let (_, use_case) = reconcile(FakeChain::with_state(|s| {
            FakeChain::request(s, 3);
            FakeChain::request(s, 1);
            FakeChain::request(s, 3);
            FakeChain::request(s, 2);
        }));

        let pending = use_case.execute().await.unwrap();
        let order: Vec<_> = pending.iter().map(|r| r.address).collect();
        assert_eq!(order, vec![addr(3), addr(1), addr(2)]);
    }

    #[tokio::test]
    async fn test_request_vanishing_between_lookups_is_dropped_silently() {
        let (_, use_case) = reconcile(FakeChain::with_state(|s| {
            FakeChain::request(s, 1);
            FakeChain::request(s, 2);
            s.pending.remove(&addr(1));
            s.vanishing.insert(addr(1));
        }));

        let pending = use_case.execute().await.unwrap();
        assert_eq!(pending, vec![request(2)]);
    }

    #[tokio::test]
    async fn test_read_failure_aborts_whole_run() {
        let (chain, use_case) = reconcile(FakeChain::with_state(|s| {
            FakeChain::request(s, 1);
        }));
        chain
            .fail_reads
            .store(true, std::sync::atomic::Ordering::SeqCst);

        let err = use_case.execute().await.unwrap_err();
        assert!(matches!(err, ChainReadError::Unreachable(_)));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_per_address_failure_returns_no_partial_result() {
        let (_, use_case) = reconcile(FakeChain::with_state(|s| {
            FakeChain::request(s, 1);
            FakeChain::request(s, 2);
            s.failing = Some(addr(2));
        }));

        assert!(matches!(
            use_case.execute().await,
            Err(ChainReadError::Timeout)
        ));
    }

    #[tokio::test]
    async fn test_reconciliation_is_idempotent() {
        let (_, use_case) = reconcile(FakeChain::with_state(|s| {
            for byte in 1..=6 {
                FakeChain::request(s, byte);
            }
            FakeChain::approve(s, 2);
            FakeChain::reject(s, 5);
        }));

        let first = use_case.execute().await.unwrap();
        let second = use_case.execute().await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_output_is_subset_of_requested_minus_registered() {
        let (chain, use_case) = reconcile(FakeChain::with_state(|s| {
            for byte in 1..=10 {
                FakeChain::request(s, byte);
            }
            for byte in [2, 4, 6] {
                FakeChain::approve(s, byte);
            }
            for byte in [3, 9] {
                FakeChain::reject(s, byte);
            }
            FakeChain::request(s, 4);
        }));

        let pending = use_case.execute().await.unwrap();
        let state = chain.state.lock().unwrap();
        let requested: HashSet<_> = state.requested.iter().map(|l| l.institute).collect();
        let registered: HashSet<_> = state.registered_logs.iter().map(|l| l.institute).collect();

        for entry in &pending {
            assert!(requested.contains(&entry.address));
            assert!(!registered.contains(&entry.address));
            assert!(state.pending.contains_key(&entry.address));
        }
        let order: Vec<_> = pending.iter().map(|r| r.address).collect();
        assert_eq!(order, vec![addr(1), addr(5), addr(7), addr(8), addr(10)]);
    }

    #[tokio::test]
    async fn test_empty_logs() {
        let (_, use_case) = reconcile(FakeChain::new());
        assert!(use_case.execute().await.unwrap().is_empty());
    }
}

#[cfg(test)]
mod router_tests {
    use std::sync::Arc;

    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use kernel::primitives::Hash32;
    use serde_json::Value;
    use tower::ServiceExt;

    use super::support::*;
    use crate::presentation::router::registry_router;

    async fn get(chain: &Arc<FakeChain>, uri: &str) -> (StatusCode, Value) {
        let response = registry_router(chain.clone(), 0)
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_is_registered_missing_address_makes_no_chain_call() {
        let chain = Arc::new(FakeChain::new());

        let (status, body) = get(&chain, "/api/isRegistered").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Address is required");

        let (status, _) = get(&chain, "/api/isRegistered?address=").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        assert_eq!(chain.read_count(), 0);
    }

    #[tokio::test]
    async fn test_is_registered_malformed_address_makes_no_chain_call() {
        let chain = Arc::new(FakeChain::new());

        for uri in [
            "/api/isRegistered?address=0x1234",
            "/api/isRegistered?address=hello",
            "/api/isRegistered?address=0xzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzz",
        ] {
            let (status, body) = get(&chain, uri).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
            assert_eq!(body["status"], 400);
        }
        assert_eq!(chain.read_count(), 0);
    }

    #[tokio::test]
    async fn test_is_registered_echoes_address() {
        let chain = Arc::new(FakeChain::with_state(|s| {
            s.registered.insert(addr(0xab));
        }));

        let uri = "/api/isRegistered?address=0xABABABABABABABABABABABABABABABABABABABAB";
        let (status, body) = get(&chain, uri).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["address"], "0xABABABABABABABABABABABABABABABABABABABAB");
        assert_eq!(body["registered"], true);
        assert_eq!(chain.read_count(), 1);
    }

    #[tokio::test]
    async fn test_chain_failure_is_server_error() {
        let chain = Arc::new(FakeChain::new());
        chain
            .fail_reads
            .store(true, std::sync::atomic::Ordering::SeqCst);

        let uri = format!("/api/isRegistered?address={}", addr(1));
        let (status, body) = get(&chain, &uri).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["error"].as_str().unwrap().contains("connection refused"));
        assert_eq!(body["action"], "Please retry the request");

        let (status, _) = get(&chain, "/api/pending").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_pending_lists_awaiting_institutes() {
        let chain = Arc::new(FakeChain::with_state(|s| {
            FakeChain::request(s, 1);
            FakeChain::request(s, 2);
            FakeChain::approve(s, 1);
        }));

        let (status, body) = get(&chain, "/api/pending").await;
        assert_eq!(status, StatusCode::OK);
        let pending = body["pending"].as_array().unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0]["address"], addr(2).to_string());
        assert_eq!(pending[0]["name"], "Institute 2");
        assert_eq!(pending[0]["acronym"], "I2");
    }

    #[tokio::test]
    async fn test_certificate_lookup() {
        let hash = Hash32::from_bytes([5u8; 32]);
        let chain = Arc::new(FakeChain::with_state(|s| {
            s.certificates.insert(hash, certificate(hash, addr(0xaa)));
        }));

        let (status, body) = get(&chain, &format!("/api/certificate?hash={}", hash)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["certificateHash"], hash.to_string());
        assert_eq!(body["isValid"], true);
        assert_eq!(body["courseCompleted"], "Engines");
        assert_eq!(body["completionDate"], 1_700_000_000u64);
        assert!(body.get("viewerIsIssuer").is_none());

        let uri = format!("/api/certificate?hash={}&viewer={}", hash, addr(0xaa));
        let (_, body) = get(&chain, &uri).await;
        assert_eq!(body["viewerIsIssuer"], true);
        assert_eq!(body["issuer"], addr(0xaa).to_string());

        let uri = format!("/api/certificate?hash={}&viewer={}", hash, addr(0xbb));
        let (_, body) = get(&chain, &uri).await;
        assert_eq!(body["viewerIsIssuer"], false);
    }

    #[tokio::test]
    async fn test_certificate_errors() {
        let chain = Arc::new(FakeChain::new());

        let (status, _) = get(&chain, "/api/certificate").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let (status, _) = get(&chain, "/api/certificate?hash=0x1234").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(chain.read_count(), 0);

        let uri = format!("/api/certificate?hash={}", Hash32::from_bytes([9u8; 32]));
        let (status, body) = get(&chain, &uri).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Certificate not found");
    }

    #[tokio::test]
    async fn test_owner_comparison_ignores_case() {
        let chain = Arc::new(FakeChain::with_state(|s| {
            s.owner = addr(0xcd);
        }));

        let (status, body) = get(&chain, "/api/owner").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["owner"], addr(0xcd).to_string());
        assert!(body.get("isOwner").is_none());

        let uri = "/api/owner?address=0xCDCDCDCDCDCDCDCDCDCDCDCDCDCDCDCDCDCDCDCD";
        let (_, body) = get(&chain, uri).await;
        assert_eq!(body["isOwner"], true);

        let (status, _) = get(&chain, "/api/owner?address=nope").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}

#[cfg(test)]
mod watcher_tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::support::*;
    use crate::application::event_feed::poll_once;
    use crate::application::pending_requests::PendingRequestsUseCase;
    use crate::application::pending_watcher::{PendingSnapshot, PendingWatcher};
    use crate::application::subscription::{Delivery, EventHub};
    use crate::domain::events::RegistryEvent;

    async fn wait_for_version(watcher: &PendingWatcher, version: u64) -> PendingSnapshot {
        let mut changes = watcher.changes();
        tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                if changes.borrow_and_update().version >= version {
                    return changes.borrow().clone();
                }
                changes.changed().await.unwrap();
            }
        })
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_watcher_refreshes_on_event() {
        let chain = Arc::new(FakeChain::with_state(|s| {
            FakeChain::request(s, 1);
        }));
        let hub = EventHub::new(16);
        let watcher = PendingWatcher::spawn(
            PendingRequestsUseCase::new(chain.clone(), 0),
            hub.subscribe(),
        );

        let snapshot = wait_for_version(&watcher, 1).await;
        assert_eq!(snapshot.institutes.as_slice(), &[request(1)]);
        assert!(snapshot.refreshed_at.is_some());

        FakeChain::approve(&mut chain.state.lock().unwrap(), 1);
        hub.publish(RegistryEvent::Registered { institute: addr(1) });

        let snapshot = wait_for_version(&watcher, 2).await;
        assert!(snapshot.institutes.is_empty());
        assert!(snapshot.last_error.is_none());

        watcher.shutdown().await;
        assert_eq!(hub.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_watcher_keeps_last_good_snapshot_on_failure() {
        let chain = Arc::new(FakeChain::with_state(|s| {
            FakeChain::request(s, 1);
        }));
        let hub = EventHub::new(16);
        let watcher = PendingWatcher::spawn(
            PendingRequestsUseCase::new(chain.clone(), 0),
            hub.subscribe(),
        );
        wait_for_version(&watcher, 1).await;

        chain
            .fail_reads
            .store(true, std::sync::atomic::Ordering::SeqCst);
        hub.publish(RegistryEvent::Requested {
            institute: addr(2),
            name: "Institute 2".into(),
        });

        let snapshot = wait_for_version(&watcher, 2).await;
        assert_eq!(snapshot.institutes.as_slice(), &[request(1)]);
        assert!(snapshot.last_error.is_some());

        watcher.shutdown().await;
    }

    #[tokio::test]
    async fn test_poll_once_first_tick_starts_after_head() {
        let chain = FakeChain::with_state(|s| {
            FakeChain::request(s, 1);
        });
        let hub = EventHub::new(16);
        let mut subscription = hub.subscribe();

        let next = poll_once(&chain, &hub, None).await.unwrap();
        assert_eq!(next, 2);

        hub.publish(RegistryEvent::Rejected { institute: addr(9) });
        assert_eq!(
            subscription.next().await,
            Some(Delivery::Event(RegistryEvent::Rejected { institute: addr(9) }))
        );
    }

    #[tokio::test]
    async fn test_poll_once_publishes_in_chain_order() {
        let chain = FakeChain::with_state(|s| {
            FakeChain::request(s, 1);
            FakeChain::request(s, 2);
            FakeChain::reject(s, 2);
            FakeChain::approve(s, 1);
        });
        let hub = EventHub::new(16);
        let mut subscription = hub.subscribe();

        let next = poll_once(&chain, &hub, Some(2)).await.unwrap();
        assert_eq!(next, 5);

        let mut received = Vec::new();
        for _ in 0..3 {
            match subscription.next().await {
                Some(Delivery::Event(event)) => received.push(event),
                other => panic!("unexpected delivery: {other:?}"),
            }
        }
        assert_eq!(
            received,
            vec![
                RegistryEvent::Requested {
                    institute: addr(2),
                    name: "Institute 2".into()
                },
                RegistryEvent::Rejected { institute: addr(2) },
                RegistryEvent::Registered { institute: addr(1) },
            ]
        );

        assert_eq!(poll_once(&chain, &hub, Some(5)).await.unwrap(), 5);
    }
}

#[cfg(test)]
mod write_tests {
    use std::sync::Arc;

    use kernel::primitives::Hash32;

    use super::support::*;
    use crate::application::certificates::CertificateUseCase;
    use crate::application::registration::RegistrationUseCase;
    use crate::domain::entities::{IssueCertificate, RegistrationForm};
    use crate::error::RegistryError;

    fn form() -> RegistrationForm {
        RegistrationForm {
            name: "Institute of Testing".into(),
            acronym: "IOT".into(),
            website: "https://iot.example".into(),
        }
    }

    fn issue_input() -> IssueCertificate {
        IssueCertificate {
            institute_name: "Institute of Testing".into(),
            department: "CS".into(),
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            certificant_id: "S-1".into(),
            email: "ada@example.com".into(),
            course: "Engines".into(),
            completion_timestamp: 1_700_000_000,
            notes: String::new(),
            ipfs_hash: "QmHash".into(),
        }
    }

    #[tokio::test]
    async fn test_request_registration() {
        let chain = Arc::new(FakeChain::new());
        let use_case = RegistrationUseCase::new(chain.clone());

        let receipt = use_case.request(&FakeSigner(addr(1)), form()).await.unwrap();
        assert!(receipt.status);
        assert_eq!(
            chain.write_log(),
            vec![format!("request:{}:Institute of Testing", addr(1))]
        );
    }

    #[tokio::test]
    async fn test_request_rejected_before_submission() {
        let chain = Arc::new(FakeChain::with_state(|s| {
            s.registered.insert(addr(1));
            FakeChain::request(s, 2);
        }));
        let use_case = RegistrationUseCase::new(chain.clone());

        let err = use_case.request(&FakeSigner(addr(1)), form()).await.unwrap_err();
        assert!(matches!(err, RegistryError::Conflict(_)));

        let err = use_case.request(&FakeSigner(addr(2)), form()).await.unwrap_err();
        assert!(matches!(err, RegistryError::Conflict(_)));

        let blank = RegistrationForm {
            name: " ".into(),
            ..form()
        };
        let err = use_case.request(&FakeSigner(addr(3)), blank).await.unwrap_err();
        assert!(matches!(err, RegistryError::Validation(_)));

        assert!(chain.write_log().is_empty());
    }

    #[tokio::test]
    async fn test_approve_and_reject_are_owner_only() {
        let chain = Arc::new(FakeChain::with_state(|s| {
            s.owner = addr(0xcd);
            FakeChain::request(s, 1);
        }));
        let use_case = RegistrationUseCase::new(chain.clone());

        let err = use_case.approve(&FakeSigner(addr(1)), addr(1)).await.unwrap_err();
        assert!(matches!(err, RegistryError::Forbidden(_)));

        let err = use_case.reject(&FakeSigner(addr(0xcd)), addr(2)).await.unwrap_err();
        assert!(matches!(err, RegistryError::NotFound(_)));
        assert!(chain.write_log().is_empty());

        use_case.approve(&FakeSigner(addr(0xcd)), addr(1)).await.unwrap();
        use_case.reject(&FakeSigner(addr(0xcd)), addr(1)).await.unwrap();
        assert_eq!(
            chain.write_log(),
            vec![format!("approve:{}", addr(1)), format!("reject:{}", addr(1))]
        );
    }

    #[tokio::test]
    async fn test_issue_requires_registered_issuer() {
        let chain = Arc::new(FakeChain::with_state(|s| {
            s.registered.insert(addr(1));
        }));
        let use_case = CertificateUseCase::new(chain.clone());

        let err = use_case.issue(&FakeSigner(addr(2)), issue_input()).await.unwrap_err();
        assert!(matches!(err, RegistryError::Forbidden(_)));

        let issued = use_case.issue(&FakeSigner(addr(1)), issue_input()).await.unwrap();
        assert_eq!(issued.certificate_hash, Hash32::from_bytes([0x42; 32]));
        assert_eq!(chain.write_log(), vec!["issue:S-1".to_string()]);
    }

    #[tokio::test]
    async fn test_revoke_and_update_require_issuer() {
        let valid = Hash32::from_bytes([1u8; 32]);
        let revoked = Hash32::from_bytes([2u8; 32]);
        let chain = Arc::new(FakeChain::with_state(|s| {
            s.certificates.insert(valid, certificate(valid, addr(1)));
            let mut cert = certificate(revoked, addr(1));
            cert.is_valid = false;
            s.certificates.insert(revoked, cert);
        }));
        let use_case = CertificateUseCase::new(chain.clone());

        let err = use_case.revoke(&FakeSigner(addr(2)), valid).await.unwrap_err();
        assert!(matches!(err, RegistryError::Forbidden(_)));

        let err = use_case.revoke(&FakeSigner(addr(1)), revoked).await.unwrap_err();
        assert!(matches!(err, RegistryError::Conflict(_)));

        let missing = Hash32::from_bytes([3u8; 32]);
        let err = use_case.revoke(&FakeSigner(addr(1)), missing).await.unwrap_err();
        assert!(matches!(err, RegistryError::NotFound(_)));

        let err = use_case
            .update_ipfs_hash(&FakeSigner(addr(1)), valid, "  ")
            .await
            .unwrap_err();
        assert!(matches!(err, RegistryError::Validation(_)));

        use_case.revoke(&FakeSigner(addr(1)), valid).await.unwrap();
        use_case
            .update_ipfs_hash(&FakeSigner(addr(1)), revoked, "QmNew")
            .await
            .unwrap();
        assert_eq!(
            chain.write_log(),
            vec![format!("revoke:{}", valid), format!("ipfs:{}:QmNew", revoked)]
        );
    }
}

#[cfg(test)]
mod error_tests {
    use axum::body::to_bytes;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use kernel::primitives::Hash32;
    use platform::rpc::RpcError;

    use crate::error::{ChainReadError, ChainWriteError, RegistryError};

    fn rpc(code: i64, message: &str) -> RpcError {
        RpcError::Rpc {
            code,
            message: message.to_string(),
            data: None,
        }
    }

    #[test]
    fn test_read_error_classification() {
        assert!(matches!(
            ChainReadError::from(RpcError::Timeout),
            ChainReadError::Timeout
        ));
        assert!(matches!(
            ChainReadError::from(RpcError::Http(503)),
            ChainReadError::Unreachable(_)
        ));
        assert!(matches!(
            ChainReadError::from(rpc(3, "execution reverted")),
            ChainReadError::Reverted(_)
        ));
        assert!(matches!(
            ChainReadError::from(rpc(-32000, "header not found")),
            ChainReadError::Node { code: -32000, .. }
        ));
        assert!(!ChainReadError::NotConfigured("CONTRACT_ADDRESS").is_retryable());
    }

    #[test]
    fn test_write_error_classification() {
        assert!(matches!(
            ChainWriteError::from(rpc(4001, "User denied")),
            ChainWriteError::UserRejected(_)
        ));
        assert!(matches!(
            ChainWriteError::from(rpc(-32000, "Insufficient funds for gas")),
            ChainWriteError::InsufficientFunds(_)
        ));
        assert!(matches!(
            ChainWriteError::from(rpc(-32603, "VM Exception: revert")),
            ChainWriteError::Reverted { tx_hash: None, .. }
        ));
        assert!(matches!(
            ChainWriteError::from(RpcError::Timeout),
            ChainWriteError::Network(_)
        ));
    }

    #[test]
    fn test_status_codes() {
        let cases = [
            (RegistryError::validation("bad"), StatusCode::BAD_REQUEST),
            (RegistryError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (RegistryError::Forbidden("x".into()), StatusCode::FORBIDDEN),
            (RegistryError::Conflict("x".into()), StatusCode::CONFLICT),
            (
                ChainReadError::Timeout.into(),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                ChainWriteError::UserRejected("x".into()).into(),
                StatusCode::FORBIDDEN,
            ),
            (
                ChainWriteError::Reverted {
                    tx_hash: None,
                    reason: "x".into(),
                }
                .into(),
                StatusCode::CONFLICT,
            ),
            (
                ChainWriteError::Timeout {
                    tx_hash: Hash32::default(),
                }
                .into(),
                StatusCode::GATEWAY_TIMEOUT,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(err.status_code(), expected, "{err}");
        }
    }

    #[tokio::test]
    async fn test_write_timeout_response_names_transaction() {
        let tx_hash = Hash32::from_bytes([0x77; 32]);
        let response = RegistryError::from(ChainWriteError::Timeout { tx_hash }).into_response();
        assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert!(body["action"].as_str().unwrap().contains(&tx_hash.to_string()));
        assert!(body["error"].as_str().unwrap().contains("not included"));
    }
}
