//
// Copyright (c) The Nlsd Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::collections::{BTreeSet, VecDeque};

use nlsd_utils::ibus::IbusChannelsTx;
use nlsd_utils::lsa::LsaSeqNumbers;
use nlsd_utils::name::NamePrefix;
use nlsd_utils::task::TimeoutTask;
use tokio::sync::mpsc;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

use crate::adjacency::{Adjacency, AdjacencyList, AdjacencyState};
use crate::collections::{Arena, Lsdbs};
use crate::debug::Debug;
use crate::error::Error;
use crate::lsa::{AdjLsa, CoordinateLsa, NameLsa};
use crate::lsdb::{self, LsaEntry, LsaLogEntry};
use crate::tasks::messages::ProtocolInputMsg;
use crate::tasks::messages::input::{
    AdjLsaBuildMsg, LsaExpiryMsg, LsaRcvdMsg,
};
use crate::{events, tasks};

#[derive(Debug)]
pub struct Instance {
    // Instance name.
    pub name: String,
    // Instance configuration data.
    pub config: InstanceCfg,
    // Instance state data.
    pub state: Option<InstanceState>,
    // Instance arenas.
    pub arenas: InstanceArenas,
    // Instance Tx channels.
    pub tx: InstanceChannelsTx,
}

/// Static configuration of the routing instance, supplied by the daemon's
/// configuration layer.
#[derive(Clone, Debug)]
pub struct InstanceCfg {
    // This router's name.
    pub router_prefix: NamePrefix,
    // Prefix under which LSA updates are announced via the sync layer.
    pub lsa_sync_prefix: NamePrefix,
    // Refresh interval for self-originated LSAs, in seconds.
    pub lsa_refresh_interval: u64,
    // Advertised lifetime of self-originated LSAs, in seconds.
    pub lsa_lifetime: u64,
    // Number of times a foreign-LSA interest is retried before the neighbor
    // is given up on.
    pub interest_retry_count: u32,
    // Interval between interest retries, in seconds.
    pub interest_retry_interval: u64,
    // Whether routes are computed from hyperbolic coordinates instead of
    // link-state shortest paths.
    pub hyperbolic_routing: bool,
    pub hyperbolic_radius: f64,
    pub hyperbolic_angle: f64,
    // Name prefixes advertised from configuration.
    pub advertise_prefixes: BTreeSet<NamePrefix>,
}

#[derive(Debug)]
pub struct InstanceState {
    // Sequence numbers of the self-originated LSAs.
    pub seqnos: LsaSeqNumbers,
    // Link State Database.
    pub lsdb: Lsdbs,
    // Name prefixes advertised by this router.
    pub name_prefixes: BTreeSet<NamePrefix>,
    // This router's neighbors.
    pub neighbors: AdjacencyList,
    // Adjacency LSA build coalescing.
    pub adj_build_count: u32,
    pub adj_build_scheduled: bool,
    pub adj_build_timer: Option<TimeoutTask>,
    // Log of LSA updates.
    pub lsa_log: VecDeque<LsaLogEntry>,
    pub lsa_log_next_id: u32,
}

#[derive(Debug, Default)]
pub struct InstanceArenas {
    pub name_lsas: Arena<LsaEntry<NameLsa>>,
    pub adj_lsas: Arena<LsaEntry<AdjLsa>>,
    pub coordinate_lsas: Arena<LsaEntry<CoordinateLsa>>,
}

/// Instance output channels.
#[derive(Clone, Debug)]
pub struct InstanceChannelsTx {
    pub protocol_input: ProtocolInputChannelsTx,
    pub ibus: IbusChannelsTx,
}

#[derive(Clone, Debug)]
pub struct ProtocolInputChannelsTx {
    // LSA received from the network.
    pub lsa_rcvd: UnboundedSender<LsaRcvdMsg>,
    // LSA expiry/refresh timer event.
    pub lsa_expiry: UnboundedSender<LsaExpiryMsg>,
    // Request to rebuild the own Adjacency LSA.
    pub adj_lsa_build: UnboundedSender<AdjLsaBuildMsg>,
}

#[derive(Debug)]
pub struct ProtocolInputChannelsRx {
    // LSA received from the network.
    pub lsa_rcvd: UnboundedReceiver<LsaRcvdMsg>,
    // LSA expiry/refresh timer event.
    pub lsa_expiry: UnboundedReceiver<LsaExpiryMsg>,
    // Request to rebuild the own Adjacency LSA.
    pub adj_lsa_build: UnboundedReceiver<AdjLsaBuildMsg>,
}

pub struct InstanceUpView<'a> {
    pub name: &'a str,
    pub config: &'a InstanceCfg,
    pub state: &'a mut InstanceState,
    pub tx: &'a InstanceChannelsTx,
}

// ===== impl Instance =====

impl Instance {
    /// Creates a new routing instance connected to its collaborator
    /// components through `ibus`.
    pub fn new(
        name: String,
        config: InstanceCfg,
        ibus: IbusChannelsTx,
    ) -> (Instance, ProtocolInputChannelsRx) {
        Debug::InstanceCreate.log();

        let (protocol_input_tx, protocol_input_rx) = protocol_input_channels();
        let instance = Instance {
            name,
            config,
            state: None,
            arenas: Default::default(),
            tx: InstanceChannelsTx {
                protocol_input: protocol_input_tx,
                ibus,
            },
        };

        (instance, protocol_input_rx)
    }

    /// Starts the routing instance: originates the initial self LSAs and
    /// requests an Adjacency LSA build.
    pub fn start(&mut self) {
        if self.is_active() {
            return;
        }
        Debug::InstanceStart.log();

        self.state = Some(InstanceState::new(&self.config));
        let (mut instance, arenas) = self.as_up().unwrap();

        lsdb::originate_name_lsa(&mut instance, arenas);
        if instance.config.hyperbolic_routing {
            lsdb::originate_coordinate_lsa(&mut instance, arenas);
        }
        instance.schedule_adj_lsa_build();
    }

    /// Stops the routing instance, clearing the LSA database. Dropping the
    /// stored entries cancels their pending timers.
    pub fn stop(&mut self) {
        let Some(state) = &mut self.state else {
            return;
        };
        Debug::InstanceStop.log();

        state.lsdb.name.clear(&mut self.arenas.name_lsas);
        state.lsdb.adjacency.clear(&mut self.arenas.adj_lsas);
        state.lsdb.coordinate.clear(&mut self.arenas.coordinate_lsas);
        self.state = None;
    }

    /// Returns whether the instance is operational.
    pub fn is_active(&self) -> bool {
        self.state.is_some()
    }

    /// Returns a view struct for the instance if it's operational.
    pub fn as_up(&mut self) -> Option<(InstanceUpView<'_>, &mut InstanceArenas)> {
        if let Some(state) = &mut self.state {
            let instance = InstanceUpView {
                name: &self.name,
                config: &self.config,
                state,
                tx: &self.tx,
            };
            Some((instance, &mut self.arenas))
        } else {
            None
        }
    }

    /// Processes one protocol input message.
    pub fn process_protocol_msg(&mut self, msg: ProtocolInputMsg) {
        // Ignore event if the instance isn't active.
        let Some((mut instance, arenas)) = self.as_up() else {
            return;
        };

        if let Err(error) = process_protocol_msg(&mut instance, arenas, msg) {
            error.log();
        }
    }

    /// Runs the instance event loop until all input senders are gone.
    pub async fn run(mut self, mut protocol_input_rx: ProtocolInputChannelsRx) {
        while let Some(msg) = protocol_input_rx.recv().await {
            self.process_protocol_msg(msg);
        }
    }

    /// Adds `prefix` to the advertised name set and re-originates the Name
    /// LSA.
    pub fn advertise_name(&mut self, prefix: NamePrefix) -> Result<(), Error> {
        let (mut instance, arenas) =
            self.as_up().ok_or(Error::InstanceNotActive)?;

        Debug::NameAdvertise(&prefix).log();
        if instance.state.name_prefixes.insert(prefix) {
            lsdb::originate_name_lsa(&mut instance, arenas);
        }
        Ok(())
    }

    /// Removes `prefix` from the advertised name set and re-originates the
    /// Name LSA.
    pub fn withdraw_name(&mut self, prefix: &NamePrefix) -> Result<(), Error> {
        let (mut instance, arenas) =
            self.as_up().ok_or(Error::InstanceNotActive)?;

        Debug::NameWithdraw(prefix).log();
        if instance.state.name_prefixes.remove(prefix) {
            lsdb::originate_name_lsa(&mut instance, arenas);
        }
        Ok(())
    }

    /// Adds a neighbor to the local adjacency list and requests an Adjacency
    /// LSA build.
    pub fn neighbor_add(&mut self, adj: Adjacency) -> Result<(), Error> {
        let (mut instance, _) = self.as_up().ok_or(Error::InstanceNotActive)?;

        let name = adj.name.clone();
        if !instance.state.neighbors.insert(adj) {
            return Err(Error::NeighborExists(name));
        }
        instance.schedule_adj_lsa_build();
        Ok(())
    }

    /// Removes a neighbor from the local adjacency list and requests an
    /// Adjacency LSA build.
    pub fn neighbor_del(&mut self, name: &NamePrefix) -> Result<(), Error> {
        let (mut instance, _) = self.as_up().ok_or(Error::InstanceNotActive)?;

        instance
            .state
            .neighbors
            .remove(name)
            .ok_or_else(|| Error::NeighborNotFound(name.clone()))?;
        instance.schedule_adj_lsa_build();
        Ok(())
    }

    /// Records a failed hello exchange with a neighbor.
    ///
    /// Once the retry limit is reached the neighbor is taken down and an
    /// Adjacency LSA build is requested.
    pub fn neighbor_hello_failed(
        &mut self,
        name: &NamePrefix,
    ) -> Result<(), Error> {
        let (mut instance, _) = self.as_up().ok_or(Error::InstanceNotActive)?;

        let retry_limit = instance.config.interest_retry_count;
        let adj = instance
            .state
            .neighbors
            .get_mut(name)
            .ok_or_else(|| Error::NeighborNotFound(name.clone()))?;
        adj.hello_retries += 1;
        if adj.state == AdjacencyState::Up && adj.hello_retries >= retry_limit
        {
            adj.state = AdjacencyState::Down;
            instance.schedule_adj_lsa_build();
        }
        Ok(())
    }

    /// Updates a neighbor's adjacency state, requesting an Adjacency LSA
    /// build when it changed.
    pub fn neighbor_state_update(
        &mut self,
        name: &NamePrefix,
        state: AdjacencyState,
    ) -> Result<(), Error> {
        let (mut instance, _) = self.as_up().ok_or(Error::InstanceNotActive)?;

        let adj = instance
            .state
            .neighbors
            .get_mut(name)
            .ok_or_else(|| Error::NeighborNotFound(name.clone()))?;
        if adj.state == state {
            return Ok(());
        }
        adj.state = state;
        adj.hello_retries = 0;
        instance.schedule_adj_lsa_build();
        Ok(())
    }
}

// ===== impl InstanceState =====

impl InstanceState {
    fn new(config: &InstanceCfg) -> InstanceState {
        InstanceState {
            seqnos: Default::default(),
            lsdb: Default::default(),
            name_prefixes: config.advertise_prefixes.clone(),
            neighbors: Default::default(),
            adj_build_count: 0,
            adj_build_scheduled: false,
            adj_build_timer: None,
            lsa_log: Default::default(),
            lsa_log_next_id: 0,
        }
    }
}

// ===== impl InstanceCfg =====

impl Default for InstanceCfg {
    fn default() -> InstanceCfg {
        InstanceCfg {
            router_prefix: NamePrefix::root(),
            lsa_sync_prefix: NamePrefix::new("/ndn/nlsd/lsa"),
            lsa_refresh_interval: 1800,
            lsa_lifetime: 3600,
            interest_retry_count: 3,
            interest_retry_interval: 5,
            hyperbolic_routing: false,
            hyperbolic_radius: 0.0,
            hyperbolic_angle: 0.0,
            advertise_prefixes: Default::default(),
        }
    }
}

// ===== impl ProtocolInputChannelsRx =====

impl ProtocolInputChannelsRx {
    pub async fn recv(&mut self) -> Option<ProtocolInputMsg> {
        tokio::select! {
            biased;
            msg = self.lsa_rcvd.recv() => {
                msg.map(ProtocolInputMsg::LsaRcvd)
            }
            msg = self.lsa_expiry.recv() => {
                msg.map(ProtocolInputMsg::LsaExpiry)
            }
            msg = self.adj_lsa_build.recv() => {
                msg.map(ProtocolInputMsg::AdjLsaBuild)
            }
        }
    }
}

// ===== impl InstanceUpView =====

impl InstanceUpView<'_> {
    /// Returns whether `name` is this router's own name.
    pub fn is_own_router(&self, name: &NamePrefix) -> bool {
        *name == self.config.router_prefix
    }

    // Requests a rebuild of this router's Adjacency LSA. Requests are
    // coalesced while one is already pending.
    pub(crate) fn schedule_adj_lsa_build(&mut self) {
        self.state.adj_build_count += 1;
        if !self.state.adj_build_scheduled {
            self.state.adj_build_scheduled = true;
            self.state.adj_build_timer = Some(tasks::adj_lsa_build_timer(
                lsdb::ADJ_LSA_BUILD_DELAY,
                &self.tx.protocol_input.adj_lsa_build,
            ));
        }
    }
}

// ===== helper functions =====

fn process_protocol_msg(
    instance: &mut InstanceUpView<'_>,
    arenas: &mut InstanceArenas,
    msg: ProtocolInputMsg,
) -> Result<(), Error> {
    match msg {
        // LSA received from the network.
        ProtocolInputMsg::LsaRcvd(msg) => {
            events::process_lsa_rcvd(instance, arenas, msg.lsa)
        }
        // LSA expiry/refresh timer event.
        ProtocolInputMsg::LsaExpiry(msg) => events::process_lsa_expiry(
            instance,
            arenas,
            msg.lsa_type,
            msg.lse_key,
            msg.seqno,
        ),
        // Adjacency LSA build event.
        ProtocolInputMsg::AdjLsaBuild(_msg) => {
            events::process_adj_lsa_build(instance, arenas)
        }
    }
}

fn protocol_input_channels()
-> (ProtocolInputChannelsTx, ProtocolInputChannelsRx) {
    let (lsa_rcvdp, lsa_rcvdc) = mpsc::unbounded_channel();
    let (lsa_expiryp, lsa_expiryc) = mpsc::unbounded_channel();
    let (adj_lsa_buildp, adj_lsa_buildc) = mpsc::unbounded_channel();

    let tx = ProtocolInputChannelsTx {
        lsa_rcvd: lsa_rcvdp,
        lsa_expiry: lsa_expiryp,
        adj_lsa_build: adj_lsa_buildp,
    };
    let rx = ProtocolInputChannelsRx {
        lsa_rcvd: lsa_rcvdc,
        lsa_expiry: lsa_expiryc,
        adj_lsa_build: adj_lsa_buildc,
    };

    (tx, rx)
}
