//
// Copyright (c) The Nlsd Core Contributors
//
// SPDX-License-Identifier: MIT
//

use nlsd::adjacency::{Adjacency, AdjacencyState};
use nlsd::lsdb::InstallResult;
use nlsd::tasks::messages::input::{AdjLsaBuildMsg, ProtocolMsg};
use nlsd_utils::ibus::IbusMsg;
use nlsd_utils::lsa::LsaType;
use nlsd_utils::name::NamePrefix;

use crate::{
    ROUTER, adj_lsa, drain, drain_all, entry, fire_expiry, get_adj_lsa,
    install, link, lsa_exists, prefix_adds, prefix_dels, seqnos, setup,
};

fn fire_adj_lsa_build(instance: &mut nlsd::instance::Instance) {
    instance.process_protocol_msg(ProtocolMsg::AdjLsaBuild(AdjLsaBuildMsg {}));
}

fn neighbor(name: &str) -> Adjacency {
    Adjacency::new(NamePrefix::new(name), format!("udp4://{name}"), 10)
}

#[test]
fn install_foreign_adj_lsa() {
    let (mut instance, mut ibus_rx) = setup();
    drain_all(&mut ibus_rx);

    let result = install(
        &mut instance,
        adj_lsa("/net/site/rB", 1, vec![link("/net/site/rC", 10)]),
    );
    assert_eq!(result, InstallResult::Installed);

    // The origin router becomes reachable and the topology changed.
    let adds = prefix_adds(&drain(&mut ibus_rx.prefix_table));
    assert_eq!(adds, vec![entry("/net/site/rB", "/net/site/rB")]);
    assert_eq!(drain(&mut ibus_rx.route_calc).len(), 1);
}

#[test]
fn unchanged_adjacencies_skip_route_calc() {
    let (mut instance, mut ibus_rx) = setup();

    let links = vec![link("/net/site/rC", 10), link("/net/site/rD", 20)];
    install(&mut instance, adj_lsa("/net/site/rB", 1, links.clone()));
    drain_all(&mut ibus_rx);

    // Higher sequence number, identical payload: header is updated and the
    // timer re-armed, but no recomputation is scheduled.
    let result = install(&mut instance, adj_lsa("/net/site/rB", 2, links));
    assert_eq!(result, InstallResult::Refreshed);

    let lsa = get_adj_lsa(&mut instance, "/net/site/rB").unwrap();
    assert_eq!(lsa.hdr.seqno, 2);
    assert!(drain(&mut ibus_rx.route_calc).is_empty());
}

#[test]
fn changed_adjacencies_trigger_route_calc() {
    let (mut instance, mut ibus_rx) = setup();

    install(
        &mut instance,
        adj_lsa("/net/site/rB", 1, vec![link("/net/site/rC", 10)]),
    );
    drain_all(&mut ibus_rx);

    let result = install(
        &mut instance,
        adj_lsa("/net/site/rB", 2, vec![link("/net/site/rC", 50)]),
    );
    assert_eq!(result, InstallResult::Refreshed);

    let lsa = get_adj_lsa(&mut instance, "/net/site/rB").unwrap();
    assert_eq!(lsa.links[0].cost, 50);
    assert_eq!(drain(&mut ibus_rx.route_calc).len(), 1);
}

#[test]
fn own_adj_lsa_is_built_from_active_neighbors() {
    let (mut instance, mut ibus_rx) = setup();

    instance.neighbor_add(neighbor("/net/site/rB")).unwrap();
    instance
        .neighbor_state_update(&NamePrefix::new("/net/site/rB"), AdjacencyState::Up)
        .unwrap();
    drain_all(&mut ibus_rx);

    fire_adj_lsa_build(&mut instance);

    let lsa = get_adj_lsa(&mut instance, ROUTER).unwrap();
    assert_eq!(lsa.hdr.seqno, 1);
    assert_eq!(lsa.link_count, 1);
    assert_eq!(lsa.links[0].neighbor, NamePrefix::new("/net/site/rB"));
    assert_eq!(seqnos(&mut instance).adjacency, 1);

    // The origination was announced and the topology changed.
    assert_eq!(drain(&mut ibus_rx.sync).len(), 1);
    assert_eq!(drain(&mut ibus_rx.route_calc).len(), 1);
}

#[test]
fn build_is_postponed_while_handshakes_are_pending() {
    let (mut instance, mut ibus_rx) = setup();

    // A freshly added neighbor is down with retries remaining.
    instance.neighbor_add(neighbor("/net/site/rB")).unwrap();
    drain_all(&mut ibus_rx);

    fire_adj_lsa_build(&mut instance);

    assert!(get_adj_lsa(&mut instance, ROUTER).is_none());
    assert!(drain(&mut ibus_rx.sync).is_empty());
    let (up, _) = instance.as_up().unwrap();
    assert!(up.state.adj_build_scheduled);
    assert!(up.state.adj_build_timer.is_some());
}

#[test]
fn own_adj_lsa_is_withdrawn_without_active_neighbors() {
    let (mut instance, mut ibus_rx) = setup();

    instance.neighbor_add(neighbor("/net/site/rB")).unwrap();
    instance
        .neighbor_state_update(&NamePrefix::new("/net/site/rB"), AdjacencyState::Up)
        .unwrap();
    fire_adj_lsa_build(&mut instance);
    assert!(lsa_exists(&mut instance, LsaType::Adjacency, ROUTER));

    instance.neighbor_del(&NamePrefix::new("/net/site/rB")).unwrap();
    drain_all(&mut ibus_rx);
    fire_adj_lsa_build(&mut instance);

    assert!(!lsa_exists(&mut instance, LsaType::Adjacency, ROUTER));
    assert_eq!(drain(&mut ibus_rx.route_calc).len(), 1);
}

#[test]
fn self_refresh_triggers_route_calc() {
    let (mut instance, mut ibus_rx) = setup();

    instance.neighbor_add(neighbor("/net/site/rB")).unwrap();
    instance
        .neighbor_state_update(&NamePrefix::new("/net/site/rB"), AdjacencyState::Up)
        .unwrap();
    fire_adj_lsa_build(&mut instance);
    drain_all(&mut ibus_rx);

    fire_expiry(&mut instance, LsaType::Adjacency, ROUTER, 1);

    let lsa = get_adj_lsa(&mut instance, ROUTER).unwrap();
    assert_eq!(lsa.hdr.seqno, 2);
    assert_eq!(seqnos(&mut instance).adjacency, 2);
    assert!(matches!(
        &drain(&mut ibus_rx.sync)[..],
        [IbusMsg::RoutingUpdatePublish { seqnos, .. }] if seqnos.adjacency == 2
    ));
    assert_eq!(drain(&mut ibus_rx.route_calc).len(), 1);
}

#[test]
fn hello_failures_take_the_neighbor_down() {
    let (mut instance, mut ibus_rx) = setup();

    let name = NamePrefix::new("/net/site/rB");
    instance.neighbor_add(neighbor("/net/site/rB")).unwrap();
    instance
        .neighbor_state_update(&name, AdjacencyState::Up)
        .unwrap();
    fire_adj_lsa_build(&mut instance);
    drain_all(&mut ibus_rx);

    // Three failed hellos (the configured retry limit) take the neighbor
    // down; the subsequent build withdraws the own Adjacency LSA.
    for _ in 0..3 {
        instance.neighbor_hello_failed(&name).unwrap();
    }
    fire_adj_lsa_build(&mut instance);

    assert!(!lsa_exists(&mut instance, LsaType::Adjacency, ROUTER));
    assert_eq!(drain(&mut ibus_rx.route_calc).len(), 1);
}

#[test]
fn foreign_expiry_removes_and_recomputes() {
    let (mut instance, mut ibus_rx) = setup();

    install(
        &mut instance,
        adj_lsa("/net/site/rB", 2, vec![link("/net/site/rC", 10)]),
    );
    drain_all(&mut ibus_rx);

    fire_expiry(&mut instance, LsaType::Adjacency, "/net/site/rB", 2);

    assert!(!lsa_exists(&mut instance, LsaType::Adjacency, "/net/site/rB"));
    let dels = prefix_dels(&drain(&mut ibus_rx.prefix_table));
    assert_eq!(dels, vec![entry("/net/site/rB", "/net/site/rB")]);
    assert_eq!(drain(&mut ibus_rx.route_calc).len(), 1);
}
