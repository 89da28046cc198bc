// Path: crates/mgmt/src/dispatcher.rs
//! The management request dispatcher.
//!
//! One dispatcher serves one or more top-level prefixes. Handlers for
//! Control Commands, Status Datasets, and Notification Streams are
//! registered under relative prefixes (pairwise non-prefix) before the
//! first top-level prefix is added. Incoming Interests are served from
//! the in-memory storage first (retransmissions), then routed to the
//! matching handler; every produced Data packet is signed and cached.

use crate::authorization::{Authorization, AuthorizationResult, RejectReply};
use crate::control_parameters::{ControlParametersBase, RawParameters};
use crate::control_response::ControlResponse;
use crate::in_memory_storage::{InMemoryStorageFifo, DEFAULT_CAPACITY};
use crate::status_dataset_context::{DatasetOutput, StatusDatasetContext};
use futures::future::BoxFuture;
use futures::FutureExt;
use ndn_api::face::{Face, RegisteredPrefixHandle};
use ndn_api::security::{KeyChain, SigningInfo};
use ndn_api::time::{Clock, SystemClock};
use ndn_types::error::{DispatchError, TlvError};
use ndn_types::tlv::{content_type, Block};
use ndn_types::{Component, Data, Interest, Name, MAX_NDN_PACKET_SIZE};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Validates and normalizes parsed command parameters.
pub type ValidateParameters = Box<dyn Fn(&dyn ControlParametersBase) -> bool + Send + Sync>;

/// Handles an authorized, validated ControlCommand; resolves with the
/// response to send.
pub type ControlCommandHandler = Box<
    dyn for<'a> Fn(
            &'a Name,
            &'a Interest,
            &'a dyn ControlParametersBase,
        ) -> BoxFuture<'a, ControlResponse>
        + Send
        + Sync,
>;

/// Handles an authorized StatusDataset request by writing into the
/// context, finishing with `end` or `reject`.
pub type StatusDatasetHandler = Box<
    dyn for<'a> Fn(
            &'a Name,
            &'a Interest,
            &'a mut StatusDatasetContext,
        ) -> BoxFuture<'a, ()>
        + Send
        + Sync,
>;

/// Extracts the command parameters from a request.
pub type ParametersParser = Box<
    dyn Fn(&Name, &Interest) -> Result<Box<dyn ControlParametersBase>, TlvError> + Send + Sync,
>;

/// Posts one notification block to a registered stream.
pub type PostNotification = Box<dyn Fn(Block) -> BoxFuture<'static, ()> + Send + Sync>;

/// The old-style parameters parser: the name component right after the
/// relative prefix carries the parameters TLV.
pub fn raw_parameters_parser(rel_prefix_len: usize) -> ParametersParser {
    Box::new(move |top_prefix, interest| {
        let index = (top_prefix.len() + rel_prefix_len) as isize;
        let component = interest
            .name()
            .get(index)
            .ok_or(TlvError::MissingElement(
                ndn_types::tlv::number::CONTROL_PARAMETERS,
            ))?;
        let params = RawParameters::from_component_value(component.value())?;
        Ok(Box::new(params) as Box<dyn ControlParametersBase>)
    })
}

enum Handler {
    Command {
        parse: ParametersParser,
        authorize: Authorization,
        validate: ValidateParameters,
        handle: ControlCommandHandler,
    },
    Dataset {
        authorize: Authorization,
        handle: StatusDatasetHandler,
    },
}

/// The request dispatcher.
pub struct Dispatcher {
    face: Arc<dyn Face>,
    key_chain: Arc<dyn KeyChain>,
    signing_info: SigningInfo,
    clock: Arc<dyn Clock>,
    handlers: Mutex<Vec<(Name, Arc<Handler>)>>,
    rel_prefixes: Mutex<Vec<Name>>,
    streams: Mutex<HashMap<Name, u64>>,
    top_prefixes: Mutex<HashMap<Name, Option<RegisteredPrefixHandle>>>,
    storage: Mutex<InMemoryStorageFifo>,
}

impl Dispatcher {
    /// Creates a dispatcher with the default storage capacity.
    pub fn new(
        face: Arc<dyn Face>,
        key_chain: Arc<dyn KeyChain>,
        signing_info: SigningInfo,
    ) -> Self {
        Self::with_capacity(face, key_chain, signing_info, DEFAULT_CAPACITY)
    }

    /// Creates a dispatcher with an explicit storage capacity.
    pub fn with_capacity(
        face: Arc<dyn Face>,
        key_chain: Arc<dyn KeyChain>,
        signing_info: SigningInfo,
        ims_capacity: usize,
    ) -> Self {
        Self {
            face,
            key_chain,
            signing_info,
            clock: Arc::new(SystemClock),
            handlers: Mutex::new(Vec::new()),
            rel_prefixes: Mutex::new(Vec::new()),
            streams: Mutex::new(HashMap::new()),
            top_prefixes: Mutex::new(HashMap::new()),
            storage: Mutex::new(InMemoryStorageFifo::new(ims_capacity)),
        }
    }

    /// Replaces the clock (used by tests for deterministic versions).
    pub fn set_clock(&mut self, clock: Arc<dyn Clock>) {
        self.clock = clock;
    }

    fn check_prefix(&self, rel_prefix: &Name) -> Result<(), DispatchError> {
        let Ok(top_prefixes) = self.top_prefixes.lock() else {
            return Err(DispatchError::TopPrefixPresent);
        };
        if !top_prefixes.is_empty() {
            return Err(DispatchError::TopPrefixPresent);
        }
        drop(top_prefixes);

        let Ok(mut rel_prefixes) = self.rel_prefixes.lock() else {
            return Err(DispatchError::RelPrefixOverlap(rel_prefix.clone()));
        };
        let overlaps = rel_prefixes
            .iter()
            .any(|p| p.is_prefix_of(rel_prefix) || rel_prefix.is_prefix_of(p));
        if overlaps {
            return Err(DispatchError::RelPrefixOverlap(rel_prefix.clone()));
        }
        rel_prefixes.push(rel_prefix.clone());
        Ok(())
    }

    /// Registers a ControlCommand under `rel_prefix`.
    ///
    /// Must be called before the first [`Dispatcher::add_top_prefix`].
    pub fn add_control_command(
        &self,
        rel_prefix: Name,
        parse: ParametersParser,
        authorize: Authorization,
        validate: ValidateParameters,
        handle: ControlCommandHandler,
    ) -> Result<(), DispatchError> {
        self.check_prefix(&rel_prefix)?;
        if let Ok(mut handlers) = self.handlers.lock() {
            handlers.push((
                rel_prefix,
                Arc::new(Handler::Command {
                    parse,
                    authorize,
                    validate,
                    handle,
                }),
            ));
        }
        Ok(())
    }

    /// Registers a StatusDataset under `rel_prefix`.
    ///
    /// Must be called before the first [`Dispatcher::add_top_prefix`].
    pub fn add_status_dataset(
        &self,
        rel_prefix: Name,
        authorize: Authorization,
        handle: StatusDatasetHandler,
    ) -> Result<(), DispatchError> {
        self.check_prefix(&rel_prefix)?;
        if let Ok(mut handlers) = self.handlers.lock() {
            handlers.push((rel_prefix, Arc::new(Handler::Dataset { authorize, handle })));
        }
        Ok(())
    }

    /// Registers a NotificationStream under `rel_prefix`, returning the
    /// posting function.
    ///
    /// Must be called before the first [`Dispatcher::add_top_prefix`].
    pub fn add_notification_stream(
        self: &Arc<Self>,
        rel_prefix: Name,
    ) -> Result<PostNotification, DispatchError> {
        self.check_prefix(&rel_prefix)?;
        if let Ok(mut streams) = self.streams.lock() {
            streams.insert(rel_prefix.clone(), 0);
        }
        let dispatcher = Arc::clone(self);
        Ok(Box::new(move |notification: Block| {
            let dispatcher = Arc::clone(&dispatcher);
            let rel_prefix = rel_prefix.clone();
            async move {
                dispatcher.post_notification(rel_prefix, notification).await;
            }
            .boxed()
        }))
    }

    /// Adds a top-level prefix, optionally registering it through the
    /// face. Overlapping top-level prefixes are rejected.
    pub async fn add_top_prefix(
        &self,
        prefix: &Name,
        want_register: bool,
        signing_info: Option<SigningInfo>,
    ) -> Result<(), DispatchError> {
        {
            let Ok(top_prefixes) = self.top_prefixes.lock() else {
                return Err(DispatchError::TopPrefixOverlap(prefix.clone()));
            };
            let overlaps = top_prefixes
                .keys()
                .any(|p| p.is_prefix_of(prefix) || prefix.is_prefix_of(p));
            if overlaps {
                return Err(DispatchError::TopPrefixOverlap(prefix.clone()));
            }
        }

        let handle = if want_register {
            let signing = signing_info.unwrap_or_else(|| self.signing_info.clone());
            Some(self.face.register_prefix(prefix, &signing).await?)
        } else {
            None
        };

        if let Ok(mut top_prefixes) = self.top_prefixes.lock() {
            top_prefixes.insert(prefix.clone(), handle);
        }
        Ok(())
    }

    /// Removes a top-level prefix, undoing its registration. In-flight
    /// handler continuations for this prefix are silently discarded.
    pub async fn remove_top_prefix(&self, prefix: &Name) {
        let handle = match self.top_prefixes.lock() {
            Ok(mut top_prefixes) => top_prefixes.remove(prefix).flatten(),
            Err(_) => None,
        };
        if let Some(handle) = handle {
            if let Err(e) = self.face.unregister_prefix(handle).await {
                tracing::warn!(prefix = %prefix, error = %e, "prefix unregistration failed");
            }
        }
    }

    fn find_top_prefix(&self, name: &Name) -> Option<Name> {
        let top_prefixes = self.top_prefixes.lock().ok()?;
        top_prefixes
            .keys()
            .find(|prefix| prefix.is_prefix_of(name))
            .cloned()
    }

    fn top_prefix_present(&self, prefix: &Name) -> bool {
        self.top_prefixes
            .lock()
            .map(|top_prefixes| top_prefixes.contains_key(prefix))
            .unwrap_or(false)
    }

    /// Routes one incoming Interest. The face owner calls this for every
    /// Interest arriving under a registered top-level prefix.
    pub async fn on_interest(&self, interest: &Interest) {
        let Some(top_prefix) = self.find_top_prefix(interest.name()) else {
            return;
        };

        // Serve retransmissions from storage first.
        let stored = self
            .storage
            .lock()
            .ok()
            .and_then(|storage| storage.find(interest).cloned());
        if let Some(data) = stored {
            if let Err(e) = self.face.put_data(&data).await {
                tracing::warn!(name = %data.name(), error = %e, "cannot send stored response");
            }
            return;
        }

        let handler = {
            let Ok(handlers) = self.handlers.lock() else {
                return;
            };
            handlers
                .iter()
                .find(|(rel_prefix, _)| {
                    top_prefix
                        .clone()
                        .append_name(rel_prefix)
                        .is_prefix_of(interest.name())
                })
                .map(|(rel_prefix, handler)| (rel_prefix.clone(), Arc::clone(handler)))
        };
        let Some((rel_prefix, handler)) = handler else {
            return;
        };

        match handler.as_ref() {
            Handler::Command {
                parse,
                authorize,
                validate,
                handle,
            } => {
                self.process_command(&top_prefix, interest, parse, authorize, validate, handle)
                    .await;
            }
            Handler::Dataset { authorize, handle } => {
                self.process_dataset(&top_prefix, &rel_prefix, interest, authorize, handle)
                    .await;
            }
        }
    }

    async fn process_command(
        &self,
        top_prefix: &Name,
        interest: &Interest,
        parse: &ParametersParser,
        authorize: &Authorization,
        validate: &ValidateParameters,
        handle: &ControlCommandHandler,
    ) {
        // Structurally malformed parameters: silent drop.
        let parameters = match parse(top_prefix, interest) {
            Ok(parameters) => parameters,
            Err(e) => {
                tracing::debug!(name = %interest.name(), error = %e, "dropping malformed command");
                return;
            }
        };

        match authorize(top_prefix, interest, Some(parameters.as_ref())).await {
            AuthorizationResult::Reject(RejectReply::Silent) => {}
            AuthorizationResult::Reject(RejectReply::Status403) => {
                self.send_control_response(
                    top_prefix,
                    interest,
                    ControlResponse::new(403, "authorization rejected"),
                    false,
                )
                .await;
            }
            AuthorizationResult::Accept { requester } => {
                tracing::debug!(name = %interest.name(), %requester, "command authorized");
                if !validate(parameters.as_ref()) {
                    self.send_control_response(
                        top_prefix,
                        interest,
                        ControlResponse::new(400, "failed in validating parameters"),
                        false,
                    )
                    .await;
                    return;
                }
                let response = handle(top_prefix, interest, parameters.as_ref()).await;
                self.send_control_response(top_prefix, interest, response, false)
                    .await;
            }
        }
    }

    async fn process_dataset(
        &self,
        top_prefix: &Name,
        rel_prefix: &Name,
        interest: &Interest,
        authorize: &Authorization,
        handle: &StatusDatasetHandler,
    ) {
        // A dataset request must not itself carry version or segment
        // components (those name stored segments, served above).
        let base_len = top_prefix.len() + rel_prefix.len();
        let has_versioning = interest
            .name()
            .components()
            .iter()
            .skip(base_len)
            .any(|c| c.is_version() || c.is_segment());
        if has_versioning {
            return;
        }

        match authorize(top_prefix, interest, None).await {
            AuthorizationResult::Reject(RejectReply::Silent) => {}
            AuthorizationResult::Reject(RejectReply::Status403) => {
                self.send_control_response(
                    top_prefix,
                    interest,
                    ControlResponse::new(403, "authorization rejected"),
                    false,
                )
                .await;
            }
            AuthorizationResult::Accept { requester } => {
                tracing::debug!(name = %interest.name(), %requester, "dataset authorized");
                let version = self.clock.system_now().timestamp_millis().max(0) as u64;
                let mut context = StatusDatasetContext::new(interest, version);
                handle(top_prefix, interest, &mut context).await;
                match context.into_output() {
                    DatasetOutput::Segments(segments) => {
                        for segment in segments {
                            let final_block_id = segment
                                .is_final_block
                                .then(|| segment.name.at(-1).clone());
                            self.send_data(
                                top_prefix,
                                segment.name,
                                segment.content,
                                content_type::BLOB,
                                final_block_id,
                            )
                            .await;
                        }
                    }
                    DatasetOutput::Reject(response) => {
                        self.send_control_response(top_prefix, interest, response, true)
                            .await;
                    }
                    DatasetOutput::Incomplete => {
                        tracing::warn!(
                            name = %interest.name(),
                            "dataset handler finished without end() or reject()"
                        );
                    }
                }
            }
        }
    }

    async fn post_notification(&self, rel_prefix: Name, notification: Block) {
        let top_prefix = {
            let Ok(top_prefixes) = self.top_prefixes.lock() else {
                return;
            };
            if top_prefixes.len() != 1 {
                tracing::error!(
                    count = top_prefixes.len(),
                    "notifications require exactly one top-level prefix"
                );
                return;
            }
            match top_prefixes.keys().next() {
                Some(prefix) => prefix.clone(),
                None => return,
            }
        };

        let seq_num = match self.streams.lock() {
            Ok(mut streams) => match streams.get_mut(&rel_prefix) {
                Some(counter) => {
                    let seq_num = *counter;
                    *counter += 1;
                    seq_num
                }
                None => return,
            },
            Err(_) => return,
        };

        let name = top_prefix
            .clone()
            .append_name(&rel_prefix)
            .append_sequence_number(seq_num);
        let mut content = Vec::new();
        notification.encode_into(&mut content);
        self.send_data(&top_prefix, name, content, content_type::BLOB, None)
            .await;
    }

    async fn send_control_response(
        &self,
        top_prefix: &Name,
        interest: &Interest,
        response: ControlResponse,
        is_nack: bool,
    ) {
        let content_type = if is_nack {
            content_type::NACK
        } else {
            content_type::BLOB
        };
        self.send_data(
            top_prefix,
            interest.name().clone(),
            response.to_block().encode(),
            content_type,
            None,
        )
        .await;
    }

    async fn send_data(
        &self,
        top_prefix: &Name,
        name: Name,
        content: Vec<u8>,
        content_type: u32,
        final_block_id: Option<Component>,
    ) {
        // A continuation firing after removeTopPrefix is discarded.
        if !self.top_prefix_present(top_prefix) {
            tracing::debug!(name = %name, "discarding response for removed top-level prefix");
            return;
        }

        let mut data = Data::new(name);
        data.set_content_type(content_type)
            .set_freshness_period(Some(Duration::from_secs(1)))
            .set_final_block_id(final_block_id)
            .set_content(content);
        if let Err(e) = self.key_chain.sign_data(&mut data, &self.signing_info) {
            tracing::error!(name = %data.name(), error = %e, "cannot sign response");
            return;
        }
        match data.wire_encode() {
            Ok(wire) if wire.len() > MAX_NDN_PACKET_SIZE => {
                tracing::error!(
                    name = %data.name(),
                    size = wire.len(),
                    "response exceeds maximum packet size, dropping"
                );
                return;
            }
            Ok(_) => {}
            Err(e) => {
                tracing::error!(name = %data.name(), error = %e, "cannot encode response");
                return;
            }
        }

        if let Err(e) = self.face.put_data(&data).await {
            tracing::warn!(name = %data.name(), error = %e, "cannot send response");
        }
        if let Ok(mut storage) = self.storage.lock() {
            storage.insert(data);
        }
    }

    /// Number of packets in the retransmission storage.
    pub fn storage_len(&self) -> usize {
        self.storage.lock().map(|s| s.len()).unwrap_or(0)
    }
}
