//
// Copyright (c) The Nlsd Core Contributors
//
// SPDX-License-Identifier: MIT
//

use maplit::btreeset;
use nlsd::lsdb::InstallResult;
use nlsd_utils::ibus::IbusMsg;
use nlsd_utils::lsa::LsaType;
use nlsd_utils::name::NamePrefix;

use crate::{
    ROUTER, drain, drain_all, entry, fire_expiry, get_name_lsa, install,
    lsa_exists, name_lsa, prefix_adds, prefix_dels, seqnos, setup,
};

#[test]
fn install_foreign_name_lsa() {
    let (mut instance, mut ibus_rx) = setup();
    drain_all(&mut ibus_rx);

    let result =
        install(&mut instance, name_lsa("/net/site/rB", 1, &["/b1", "/b2"]));
    assert_eq!(result, InstallResult::Installed);
    assert!(lsa_exists(&mut instance, LsaType::Name, "/net/site/rB"));

    // The origin router and every advertised name point at the origin.
    let adds = prefix_adds(&drain(&mut ibus_rx.prefix_table));
    assert_eq!(
        adds,
        vec![
            entry("/net/site/rB", "/net/site/rB"),
            entry("/b1", "/net/site/rB"),
            entry("/b2", "/net/site/rB"),
        ]
    );
}

#[test]
fn own_prefix_is_never_registered() {
    let (mut instance, mut ibus_rx) = setup();
    drain_all(&mut ibus_rx);

    // A foreign LSA advertising this router's own prefix must not register
    // it in the prefix table.
    install(&mut instance, name_lsa("/net/site/rB", 1, &[ROUTER, "/b1"]));

    let adds = prefix_adds(&drain(&mut ibus_rx.prefix_table));
    assert_eq!(
        adds,
        vec![
            entry("/net/site/rB", "/net/site/rB"),
            entry("/b1", "/net/site/rB"),
        ]
    );
}

#[test]
fn stale_instances_are_discarded() {
    let (mut instance, mut ibus_rx) = setup();

    install(&mut instance, name_lsa("/net/site/rB", 5, &["/b1"]));
    drain_all(&mut ibus_rx);

    // Duplicate delivery.
    let result = install(&mut instance, name_lsa("/net/site/rB", 5, &["/bogus"]));
    assert_eq!(result, InstallResult::Stale);

    // Out-of-order delivery.
    let result = install(&mut instance, name_lsa("/net/site/rB", 4, &["/bogus"]));
    assert_eq!(result, InstallResult::Stale);

    // Stored content is untouched and no prefix-table updates were issued.
    let lsa = get_name_lsa(&mut instance, "/net/site/rB").unwrap();
    assert_eq!(lsa.hdr.seqno, 5);
    assert_eq!(lsa.name_list, btreeset![NamePrefix::new("/b1")]);
    assert!(drain(&mut ibus_rx.prefix_table).is_empty());
}

#[test]
fn merge_applies_name_set_difference() {
    let (mut instance, mut ibus_rx) = setup();

    install(&mut instance, name_lsa("/net/site/rB", 1, &["/a", "/b", "/c"]));
    drain_all(&mut ibus_rx);

    let result =
        install(&mut instance, name_lsa("/net/site/rB", 2, &["/b", "/c", "/d"]));
    assert_eq!(result, InstallResult::Refreshed);

    let lsa = get_name_lsa(&mut instance, "/net/site/rB").unwrap();
    assert_eq!(lsa.hdr.seqno, 2);
    assert_eq!(
        lsa.name_list,
        btreeset![
            NamePrefix::new("/b"),
            NamePrefix::new("/c"),
            NamePrefix::new("/d")
        ]
    );

    // Exactly one registration (the added name) and one retraction (the
    // removed name).
    let msgs = drain(&mut ibus_rx.prefix_table);
    assert_eq!(prefix_adds(&msgs), vec![entry("/d", "/net/site/rB")]);
    assert_eq!(prefix_dels(&msgs), vec![entry("/a", "/net/site/rB")]);
}

#[test]
fn merge_grows_advertised_set() {
    let (mut instance, mut ibus_rx) = setup();

    install(&mut instance, name_lsa("/site/rA2", 1, &["/a"]));
    drain_all(&mut ibus_rx);

    install(&mut instance, name_lsa("/site/rA2", 2, &["/a", "/b"]));

    let lsa = get_name_lsa(&mut instance, "/site/rA2").unwrap();
    assert_eq!(lsa.hdr.seqno, 2);
    assert_eq!(
        lsa.name_list,
        btreeset![NamePrefix::new("/a"), NamePrefix::new("/b")]
    );
    let adds = prefix_adds(&drain(&mut ibus_rx.prefix_table));
    assert_eq!(adds, vec![entry("/b", "/site/rA2")]);
}

#[test]
fn self_originated_lsa_skips_prefix_table() {
    let (mut instance, mut ibus_rx) = setup();

    // The own Name LSA was originated on startup; announcements go to the
    // sync layer, never to the prefix table.
    assert!(lsa_exists(&mut instance, LsaType::Name, ROUTER));
    assert!(drain(&mut ibus_rx.prefix_table).is_empty());
    assert_eq!(drain(&mut ibus_rx.sync).len(), 1);

    // Advertising a new prefix re-originates the LSA but still doesn't touch
    // the prefix table.
    instance.advertise_name(NamePrefix::new("/net/site/app")).unwrap();
    assert!(drain(&mut ibus_rx.prefix_table).is_empty());
}

#[test]
fn advertise_and_withdraw_reoriginate() {
    let (mut instance, mut ibus_rx) = setup();
    drain_all(&mut ibus_rx);

    let prefix = NamePrefix::new("/net/site/app");
    instance.advertise_name(prefix.clone()).unwrap();

    let lsa = get_name_lsa(&mut instance, ROUTER).unwrap();
    assert_eq!(lsa.hdr.seqno, 2);
    assert!(lsa.name_list.contains(&prefix));
    assert_eq!(seqnos(&mut instance).name, 2);

    // Re-advertising the same prefix is a no-op.
    instance.advertise_name(prefix.clone()).unwrap();
    assert_eq!(seqnos(&mut instance).name, 2);

    instance.withdraw_name(&prefix).unwrap();
    let lsa = get_name_lsa(&mut instance, ROUTER).unwrap();
    assert_eq!(lsa.hdr.seqno, 3);
    assert!(!lsa.name_list.contains(&prefix));

    // Every origination was announced via the sync layer.
    let publishes = drain(&mut ibus_rx.sync);
    assert_eq!(publishes.len(), 2);
    assert!(publishes.iter().all(|msg| matches!(
        msg,
        IbusMsg::RoutingUpdatePublish { seqnos, .. } if seqnos.name >= 2
    )));
}

#[test]
fn self_refresh_bumps_sequence_number() {
    let (mut instance, mut ibus_rx) = setup();
    drain_all(&mut ibus_rx);

    fire_expiry(&mut instance, LsaType::Name, ROUTER, 1);

    // The LSA was refreshed, not removed.
    let lsa = get_name_lsa(&mut instance, ROUTER).unwrap();
    assert_eq!(lsa.hdr.seqno, 2);
    assert_eq!(seqnos(&mut instance).name, 2);

    // The new sequence number was announced.
    let publishes = drain(&mut ibus_rx.sync);
    assert_eq!(publishes.len(), 1);
    assert!(matches!(
        &publishes[0],
        IbusMsg::RoutingUpdatePublish { seqnos, lsa_prefix }
            if seqnos.name == 2
                && lsa_prefix == &NamePrefix::new("/ndn/nlsd/lsa/net/site/rA")
    ));
}

#[test]
fn foreign_expiry_removes_the_lsa() {
    let (mut instance, mut ibus_rx) = setup();

    install(&mut instance, name_lsa("/net/site/rB", 3, &["/b1"]));
    drain_all(&mut ibus_rx);

    fire_expiry(&mut instance, LsaType::Name, "/net/site/rB", 3);

    assert!(!lsa_exists(&mut instance, LsaType::Name, "/net/site/rB"));
    let dels = prefix_dels(&drain(&mut ibus_rx.prefix_table));
    assert_eq!(
        dels,
        vec![
            entry("/net/site/rB", "/net/site/rB"),
            entry("/b1", "/net/site/rB"),
        ]
    );
}

#[test]
fn stale_timer_events_are_ignored() {
    let (mut instance, mut ibus_rx) = setup();

    install(&mut instance, name_lsa("/net/site/rB", 3, &["/b1"]));
    install(&mut instance, name_lsa("/net/site/rB", 4, &["/b1"]));
    drain_all(&mut ibus_rx);

    // The timer armed for seqno 3 fires after the update to seqno 4 was
    // merged: it must not remove the entry.
    fire_expiry(&mut instance, LsaType::Name, "/net/site/rB", 3);
    assert!(lsa_exists(&mut instance, LsaType::Name, "/net/site/rB"));

    // Same for a timer whose entry is gone entirely.
    fire_expiry(&mut instance, LsaType::Name, "/net/site/rC", 1);

    // The entry armed for the current sequence number still works.
    fire_expiry(&mut instance, LsaType::Name, "/net/site/rB", 4);
    assert!(!lsa_exists(&mut instance, LsaType::Name, "/net/site/rB"));
}
