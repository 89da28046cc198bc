// Path: crates/mgmt/tests/dispatcher.rs
//! End-to-end dispatcher scenarios: control commands with authorization,
//! dataset segmentation, and notification streams.

use futures::FutureExt;
use ndn_api::security::SigningInfo;
use ndn_mgmt::authorization::{Authorization, AuthorizationResult, RejectReply};
use ndn_mgmt::dispatcher::{
    raw_parameters_parser, ControlCommandHandler, StatusDatasetHandler, ValidateParameters,
};
use ndn_mgmt::status_dataset_context::MAX_PAYLOAD_LENGTH;
use ndn_mgmt::{ControlResponse, Dispatcher};
use ndn_test_utils::{MemoryKeyChain, MockFace};
use ndn_types::tlv::Block;
use ndn_types::{Component, Interest, Name};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn name(uri: &str) -> Name {
    Name::from_uri(uri).unwrap()
}

fn test_dispatcher() -> (Arc<Dispatcher>, Arc<MockFace>) {
    let face = Arc::new(MockFace::new());
    let key_chain = Arc::new(MemoryKeyChain::new());
    key_chain.create_identity(&name("/dispatcher")).unwrap();
    let dispatcher = Arc::new(Dispatcher::new(
        face.clone(),
        key_chain,
        SigningInfo::default(),
    ));
    (dispatcher, face)
}

/// Accepts names ending in `valid`, silently drops `silent`, else 403.
fn suffix_authorization() -> Authorization {
    Box::new(|_prefix, interest, _params| {
        let last = String::from_utf8_lossy(interest.name().at(-1).value()).into_owned();
        async move {
            match last.as_str() {
                "valid" => AuthorizationResult::Accept {
                    requester: "tester".into(),
                },
                "silent" => AuthorizationResult::Reject(RejectReply::Silent),
                _ => AuthorizationResult::Reject(RejectReply::Status403),
            }
        }
        .boxed()
    })
}

fn accept_all() -> Authorization {
    ndn_mgmt::make_accept_all_authorization()
}

fn params_component() -> Component {
    // An empty ControlParameters-style TLV, `%80%00` on the wire.
    Component::generic(Block::empty(0x80).encode())
}

#[tokio::test]
async fn control_command_authorization_flow() {
    let (dispatcher, face) = test_dispatcher();
    let invocations = Arc::new(AtomicUsize::new(0));
    let counter = invocations.clone();

    let validate: ValidateParameters = Box::new(|_| true);
    let handle: ControlCommandHandler = Box::new(move |_prefix, _interest, _params| {
        let counter = counter.clone();
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
            ControlResponse::new(200, "OK")
        }
        .boxed()
    });
    dispatcher
        .add_control_command(
            name("/test"),
            raw_parameters_parser(1),
            suffix_authorization(),
            validate,
            handle,
        )
        .unwrap();
    dispatcher
        .add_top_prefix(&name("/root"), false, None)
        .await
        .unwrap();

    // No suffix: 403 reply.
    let rejected = Interest::new(name("/root/test").append(params_component()));
    dispatcher.on_interest(&rejected).await;
    let sent = face.sent_data();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].name(), rejected.name());
    let response = ControlResponse::from_block(&Block::from_slice(sent[0].content()).unwrap())
        .unwrap();
    assert_eq!(response.code(), 403);
    assert_eq!(invocations.load(Ordering::SeqCst), 0);

    // `silent` suffix: no reply at all.
    face.clear_traffic();
    let silent = Interest::new(
        name("/root/test")
            .append(params_component())
            .append_str("silent"),
    );
    dispatcher.on_interest(&silent).await;
    assert!(face.sent_data().is_empty());
    assert_eq!(invocations.load(Ordering::SeqCst), 0);

    // `valid` suffix: handler runs exactly once, 200 reply.
    face.clear_traffic();
    let valid = Interest::new(
        name("/root/test")
            .append(params_component())
            .append_str("valid"),
    );
    dispatcher.on_interest(&valid).await;
    let sent = face.sent_data();
    assert_eq!(sent.len(), 1);
    let response = ControlResponse::from_block(&Block::from_slice(sent[0].content()).unwrap())
        .unwrap();
    assert_eq!(response.code(), 200);
    assert_eq!(invocations.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn malformed_parameters_are_dropped_silently() {
    let (dispatcher, face) = test_dispatcher();
    let validate: ValidateParameters = Box::new(|_| true);
    let handle: ControlCommandHandler = Box::new(|_prefix, _interest, _params| {
        async { ControlResponse::new(200, "OK") }.boxed()
    });
    dispatcher
        .add_control_command(
            name("/test"),
            raw_parameters_parser(1),
            accept_all(),
            validate,
            handle,
        )
        .unwrap();
    dispatcher
        .add_top_prefix(&name("/root"), false, None)
        .await
        .unwrap();

    // Truncated TLV in the parameters component.
    let malformed = Interest::new(name("/root/test").append(Component::generic(vec![0x80])));
    dispatcher.on_interest(&malformed).await;
    assert!(face.sent_data().is_empty());
}

#[tokio::test]
async fn invalid_parameters_get_400() {
    let (dispatcher, face) = test_dispatcher();
    let validate: ValidateParameters = Box::new(|_| false);
    let handle: ControlCommandHandler = Box::new(|_prefix, _interest, _params| {
        async { ControlResponse::new(200, "OK") }.boxed()
    });
    dispatcher
        .add_control_command(
            name("/test"),
            raw_parameters_parser(1),
            accept_all(),
            validate,
            handle,
        )
        .unwrap();
    dispatcher
        .add_top_prefix(&name("/root"), false, None)
        .await
        .unwrap();

    let interest = Interest::new(name("/root/test").append(params_component()));
    dispatcher.on_interest(&interest).await;
    let sent = face.sent_data();
    assert_eq!(sent.len(), 1);
    let response = ControlResponse::from_block(&Block::from_slice(sent[0].content()).unwrap())
        .unwrap();
    assert_eq!(response.code(), 400);
}

#[tokio::test]
async fn status_dataset_segments_large_payload() {
    let (dispatcher, face) = test_dispatcher();
    let blob = Arc::new(vec![0x42u8; 10_000]);
    let handler_blob = blob.clone();

    let handle: StatusDatasetHandler = Box::new(move |_prefix, _interest, context| {
        let blob = handler_blob.clone();
        async move {
            context.append(&blob).unwrap();
            context.end().unwrap();
        }
        .boxed()
    });
    dispatcher
        .add_status_dataset(name("/status"), accept_all(), handle)
        .unwrap();
    dispatcher
        .add_top_prefix(&name("/root"), false, None)
        .await
        .unwrap();

    let request = Interest::new(name("/root/status"));
    dispatcher.on_interest(&request).await;

    let sent = face.sent_data();
    assert_eq!(sent.len(), 2);

    // Segment numbering and the final-block marker.
    assert!(sent[0].name().at(-2).is_version());
    assert_eq!(sent[0].name().at(-1).to_number().unwrap(), 0);
    assert!(sent[0].final_block_id().is_none());
    assert_eq!(sent[0].content().len(), MAX_PAYLOAD_LENGTH);

    assert_eq!(sent[1].name().at(-1).to_number().unwrap(), 1);
    assert_eq!(sent[1].final_block_id(), Some(sent[1].name().at(-1)));

    // Concatenated content equals the original blob.
    let total: Vec<u8> = sent
        .iter()
        .flat_map(|data| data.content().iter().copied())
        .collect();
    assert_eq!(total, *blob);

    // Both segments are cached: a retransmission is served from storage
    // without re-running the handler.
    assert_eq!(dispatcher.storage_len(), 2);
    face.clear_traffic();
    let segment_interest = Interest::new(sent[0].name().clone());
    dispatcher.on_interest(&segment_interest).await;
    assert_eq!(face.sent_data().len(), 1);
    assert_eq!(dispatcher.storage_len(), 2);
}

#[tokio::test]
async fn dataset_request_with_segment_component_is_ignored() {
    let (dispatcher, face) = test_dispatcher();
    let handle: StatusDatasetHandler = Box::new(|_prefix, _interest, context| {
        async move {
            context.end().unwrap();
        }
        .boxed()
    });
    dispatcher
        .add_status_dataset(name("/status"), accept_all(), handle)
        .unwrap();
    dispatcher
        .add_top_prefix(&name("/root"), false, None)
        .await
        .unwrap();

    let versioned = Interest::new(name("/root/status").append_version(9).append_segment(0));
    dispatcher.on_interest(&versioned).await;
    assert!(face.sent_data().is_empty());
}

#[tokio::test]
async fn notification_stream_sequence_numbers() {
    let (dispatcher, face) = test_dispatcher();
    let post = dispatcher.add_notification_stream(name("/test")).unwrap();
    dispatcher
        .add_top_prefix(&name("/root"), false, None)
        .await
        .unwrap();

    let block = Block::new(0x90, b"event".to_vec());
    for _ in 0..4 {
        post(block.clone()).await;
    }

    let sent = face.sent_data();
    assert_eq!(sent.len(), 4);
    for (i, data) in sent.iter().enumerate() {
        assert_eq!(
            data.name(),
            &name("/root/test").append_sequence_number(i as u64)
        );
        assert_eq!(Block::from_slice(data.content()).unwrap(), block);
    }
    assert_eq!(dispatcher.storage_len(), 4);
}

#[tokio::test]
async fn registration_preconditions() {
    let (dispatcher, _face) = test_dispatcher();
    dispatcher
        .add_status_dataset(name("/status"), accept_all(), noop_dataset())
        .unwrap();

    // Overlapping relPrefixes are rejected both ways.
    assert!(dispatcher
        .add_status_dataset(name("/status/sub"), accept_all(), noop_dataset())
        .is_err());
    assert!(dispatcher
        .add_notification_stream(name("/status"))
        .is_err());

    dispatcher
        .add_top_prefix(&name("/root"), false, None)
        .await
        .unwrap();

    // No registrations after the first top-level prefix.
    assert!(dispatcher
        .add_status_dataset(name("/late"), accept_all(), noop_dataset())
        .is_err());

    // Overlapping top-level prefixes are rejected.
    assert!(dispatcher
        .add_top_prefix(&name("/root/nested"), false, None)
        .await
        .is_err());
    assert!(dispatcher
        .add_top_prefix(&name("/"), false, None)
        .await
        .is_err());
}

fn noop_dataset() -> StatusDatasetHandler {
    Box::new(|_prefix, _interest, context| {
        async move {
            let _ = context.end();
        }
        .boxed()
    })
}

#[tokio::test]
async fn responses_for_removed_top_prefix_are_discarded() {
    let (dispatcher, face) = test_dispatcher();
    let validate: ValidateParameters = Box::new(|_| true);
    let handle: ControlCommandHandler = Box::new(|_prefix, _interest, _params| {
        async { ControlResponse::new(200, "OK") }.boxed()
    });
    dispatcher
        .add_control_command(
            name("/test"),
            raw_parameters_parser(1),
            accept_all(),
            validate,
            handle,
        )
        .unwrap();
    dispatcher
        .add_top_prefix(&name("/root"), false, None)
        .await
        .unwrap();
    dispatcher.remove_top_prefix(&name("/root")).await;

    let interest = Interest::new(name("/root/test").append(params_component()));
    dispatcher.on_interest(&interest).await;
    assert!(face.sent_data().is_empty());
}
