//
// Copyright (c) The Nlsd Core Contributors
//
// SPDX-License-Identifier: MIT
//

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

use crate::lsa::LsaSeqNumbers;
use crate::name::NamePrefix;

// Useful type definition(s).
pub type IbusReceiver = UnboundedReceiver<IbusMsg>;
pub type IbusSender = UnboundedSender<IbusMsg>;

/// Transmit channels for sending [`IbusMsg`] messages to each collaborator
/// component.
#[derive(Clone, Debug)]
pub struct IbusChannelsTx {
    prefix_table: UnboundedSender<IbusMsg>,
    route_calc: UnboundedSender<IbusMsg>,
    sync: UnboundedSender<IbusMsg>,
}

/// Receive channels for the collaborator components.
#[derive(Debug)]
pub struct IbusChannelsRx {
    pub prefix_table: UnboundedReceiver<IbusMsg>,
    pub route_calc: UnboundedReceiver<IbusMsg>,
    pub sync: UnboundedReceiver<IbusMsg>,
}

/// Ibus message for communication among the daemon components.
#[derive(Clone, Debug, PartialEq)]
#[derive(Deserialize, Serialize)]
pub enum IbusMsg {
    /// Request to map a name prefix to a destination router in the
    /// name-prefix table.
    PrefixEntryAdd {
        prefix: NamePrefix,
        dest: NamePrefix,
    },
    /// Request to unmap a name prefix from a destination router in the
    /// name-prefix table.
    PrefixEntryDel {
        prefix: NamePrefix,
        dest: NamePrefix,
    },
    /// Request to schedule a routing table recomputation.
    RouteCalcSchedule,
    /// Request to announce updated self-originated LSA sequence numbers
    /// under the router's LSA prefix via the sync layer.
    RoutingUpdatePublish {
        seqnos: LsaSeqNumbers,
        lsa_prefix: NamePrefix,
    },
}

// ===== impl IbusChannelsTx =====

impl IbusChannelsTx {
    /// Sends an [`IbusMsg::PrefixEntryAdd`] message to the name-prefix table.
    pub fn prefix_entry_add(&self, prefix: NamePrefix, dest: NamePrefix) {
        let msg = IbusMsg::PrefixEntryAdd { prefix, dest };
        let _ = self.prefix_table.send(msg);
    }

    /// Sends an [`IbusMsg::PrefixEntryDel`] message to the name-prefix table.
    pub fn prefix_entry_del(&self, prefix: NamePrefix, dest: NamePrefix) {
        let msg = IbusMsg::PrefixEntryDel { prefix, dest };
        let _ = self.prefix_table.send(msg);
    }

    /// Sends an [`IbusMsg::RouteCalcSchedule`] message to the routing-table
    /// calculator.
    pub fn route_calc_schedule(&self) {
        let _ = self.route_calc.send(IbusMsg::RouteCalcSchedule);
    }

    /// Sends an [`IbusMsg::RoutingUpdatePublish`] message to the sync layer.
    pub fn routing_update_publish(
        &self,
        seqnos: LsaSeqNumbers,
        lsa_prefix: NamePrefix,
    ) {
        let msg = IbusMsg::RoutingUpdatePublish { seqnos, lsa_prefix };
        let _ = self.sync.send(msg);
    }
}

// ===== global functions =====

/// Creates the ibus channel pairs connecting the protocol instance to its
/// collaborator components.
pub fn ibus_channels() -> (IbusChannelsTx, IbusChannelsRx) {
    let (prefix_table_tx, prefix_table_rx) = mpsc::unbounded_channel();
    let (route_calc_tx, route_calc_rx) = mpsc::unbounded_channel();
    let (sync_tx, sync_rx) = mpsc::unbounded_channel();

    let tx = IbusChannelsTx {
        prefix_table: prefix_table_tx,
        route_calc: route_calc_tx,
        sync: sync_tx,
    };
    let rx = IbusChannelsRx {
        prefix_table: prefix_table_rx,
        route_calc: route_calc_rx,
        sync: sync_rx,
    };

    (tx, rx)
}
