use std::convert::TryFrom;

use proptest::prelude::*;

use super::*;
use crate::constants::DEV_FDCAN_H7;
use crate::pending::Group;

fn std_blocks(begin: u32, end: u32) -> Vec<MaskFilter> {
    decompose(Domain::Standard, begin, end).collect()
}

/// Check that `blocks` tile `[begin, end]` exactly, in order.
fn assert_exact_cover(domain: Domain, blocks: &[MaskFilter], begin: u32, end: u32) {
    let mut next = begin;
    for b in blocks {
        assert_eq!(b.id & !b.mask & domain.max(), 0, "unaligned block {}", b);
        assert_eq!(b.first(), next, "gap or overlap at {}", b);
        assert!(b.last(domain) <= end, "block {} past end 0x{:x}", b, end);
        next = b.last(domain) + 1;
    }
    assert_eq!(next, end + 1);
}

fn bxcan() -> Bxcan {
    let mut filter = Bxcan::new();
    filter.begin();
    filter
}

fn g0() -> FdcanG0 {
    let mut filter = FdcanG0::new();
    filter.begin();
    filter
}

#[test]
fn test_decompose_aligned_block() {
    assert_eq!(std_blocks(0x100, 0x1ff), vec![MaskFilter::new(0x100, 0x700)]);
}

#[test]
fn test_decompose_single_zero() {
    assert_eq!(std_blocks(0, 0), vec![MaskFilter::new(0, 0x7ff)]);
}

#[test]
fn test_decompose_unaligned() {
    assert_eq!(
        std_blocks(1, 6),
        vec![
            MaskFilter::new(1, 0x7ff),
            MaskFilter::new(2, 0x7fe),
            MaskFilter::new(4, 0x7fe),
            MaskFilter::new(6, 0x7ff),
        ]
    );
}

#[test]
fn test_decompose_full_domains() {
    assert_eq!(std_blocks(0, SFF_MASK), vec![MaskFilter::new(0, 0)]);

    let ext: Vec<_> = decompose(Domain::Extended, 0, EFF_MASK).collect();
    assert_eq!(ext, vec![MaskFilter::new(0, 0)]);
    assert_eq!(ext[0].last(Domain::Extended), EFF_MASK);
}

#[test]
fn test_decompose_top_of_domain() {
    let blocks: Vec<_> = decompose(Domain::Extended, EFF_MASK, EFF_MASK).collect();
    assert_eq!(blocks, vec![MaskFilter::new(EFF_MASK, EFF_MASK)]);
    assert!(blocks[0].is_exact(Domain::Extended));
}

#[test]
fn test_decompose_clamps_to_domain() {
    assert_eq!(std_blocks(0x700, 0xffff), vec![MaskFilter::new(0x700, 0x700)]);
    assert_eq!(std_blocks(0x10, 0x0f), vec![]);

    let m = MaskFilter::new(0x700, 0x700);
    assert!(m.contains(0x7ff));
    assert!(m.contains(0x700));
    assert!(!m.contains(0x6ff));
}

#[test]
fn test_decompose_every_std_range_from_zero() {
    for end in 0..=SFF_MASK {
        let blocks = std_blocks(0, end);
        assert_exact_cover(Domain::Standard, &blocks, 0, end);
        // one block per set bit of the length
        assert_eq!(blocks.len() as u32, (end + 1).count_ones());
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn decompose_covers_std_range(a in 0u32..=SFF_MASK, b in 0u32..=SFF_MASK) {
        let (begin, end) = if a > b { (b, a) } else { (a, b) };
        let blocks = std_blocks(begin, end);
        assert_exact_cover(Domain::Standard, &blocks, begin, end);
        prop_assert!(blocks.len() <= 2 * 11);
    }

    #[test]
    fn decompose_covers_ext_range(begin in 0u32..=EFF_MASK, len in 0u32..0x0010_0000) {
        let end = begin.saturating_add(len).min(EFF_MASK);
        let blocks: Vec<_> = decompose(Domain::Extended, begin, end).collect();
        assert_exact_cover(Domain::Extended, &blocks, begin, end);
        prop_assert!(blocks.len() <= 2 * 29);
    }

    #[test]
    fn bxcan_accepts_exactly_the_range(a in 0u32..=SFF_MASK, b in 0u32..=SFF_MASK) {
        let mut filter = bxcan();
        // a single std range never needs more than 14 banks
        filter.add_std_range(a, b).unwrap();
        filter.end().unwrap();

        let (lo, hi) = if a > b { (b, a) } else { (a, b) };
        for id in 0..=SFF_MASK {
            let inside = lo <= id && id <= hi;
            prop_assert_eq!(filter.hw_config().accepts(id, Domain::Standard), inside);
        }
    }
}

#[test]
fn test_group_padding() {
    let mut group: Group<u32, 4> = Group::new();
    assert_eq!(group.padded(), None);

    group.push(7);
    group.push(8);
    assert_eq!(group.len(), 2);
    assert_eq!(group.completes(9), None);
    assert_eq!(group.padded(), Some([7, 8, 7, 7]));

    group.push(9);
    assert_eq!(group.completes(10), Some([7, 8, 9, 10]));
    // completes() does not store anything
    assert_eq!(group.len(), 3);

    group.clear();
    assert!(group.is_empty());
}

#[test]
fn test_bxcan_range_is_one_mask_bank() {
    let mut filter = bxcan();
    filter.add_std_range(0x100, 0x1ff).unwrap();
    filter.end().unwrap();

    let hw = filter.hw_config();
    assert_eq!(filter.banks_used(), 1);
    assert_eq!(hw.fs1r, 0);
    assert_eq!(hw.fm1r, 1);
    assert_eq!(hw.fa1r, 1);
    assert_eq!(hw.fr1[0], 0xe000_2000);
    assert_eq!(hw.fr2[0], 0xe000_2000);

    let m = MaskFilter::new(0x100, 0x700);
    assert_eq!(hw.bank(0), Some(Bank::StdMask([m, m])));
}

#[test]
fn test_bxcan_four_ids_one_list_bank() {
    let mut filter = bxcan();
    for id in &[0x10, 0x20, 0x30, 0x40] {
        filter.add_std_id(*id).unwrap();
    }
    // the fourth id already wrote the bank
    assert_eq!(filter.banks_used(), 1);
    filter.end().unwrap();
    assert_eq!(filter.banks_used(), 1);

    let hw = filter.hw_config();
    assert_eq!(hw.fm1r, 0);
    assert_eq!(hw.fs1r, 0);
    assert_eq!(hw.fr1[0], 0x0400_0200);
    assert_eq!(hw.fr2[0], 0x0800_0600);
    assert_eq!(hw.bank(0), Some(Bank::StdList([0x10, 0x20, 0x30, 0x40])));

    let blob = filter.config();
    assert_eq!(blob.len(), 132);
    assert_eq!(&blob[0..4], &[0, 0, 0, 0]);
    assert_eq!(&blob[16..20], &[1, 0, 0, 0]);
    assert_eq!(&blob[20..24], &[0x00, 0x02, 0x00, 0x04]);
    assert_eq!(&blob[76..80], &[0x00, 0x06, 0x00, 0x08]);
}

#[test]
fn test_bxcan_lone_id_is_duplicated() {
    let mut filter = bxcan();
    filter.add_std_id(0x55).unwrap();
    assert_eq!(filter.banks_used(), 0);
    filter.end().unwrap();

    assert_eq!(filter.hw_config().bank(0), Some(Bank::StdList([0x55; 4])));
    assert!(filter.to_string().contains("std list 0x055, 0x055, 0x055, 0x055"));
}

#[test]
fn test_bxcan_partial_list_pads_with_first() {
    let mut filter = bxcan();
    filter.add_std_id(1).unwrap();
    filter.add_std_id(2).unwrap();
    filter.add_std_id(3).unwrap();
    filter.end().unwrap();

    assert_eq!(filter.hw_config().bank(0), Some(Bank::StdList([1, 2, 3, 1])));
}

#[test]
fn test_bxcan_ext_list() {
    let mut filter = bxcan();
    filter.add_ext_id(0x1234_5678).unwrap();
    filter.add_ext_id(0x1abc_def0).unwrap();

    let hw = filter.hw_config();
    assert_eq!(hw.fr1[0], 0x91a2_b3c0);
    assert_eq!(hw.fs1r, 1);
    assert_eq!(hw.fm1r, 0);
    assert_eq!(hw.bank(0), Some(Bank::ExtList([0x1234_5678, 0x1abc_def0])));
}

#[test]
fn test_bxcan_decode_round_trip() {
    let mut filter = bxcan();
    for id in 1..=3 {
        filter.add_std_id(id).unwrap();
    }
    filter.add_std_range(0x100, 0x1ff).unwrap();
    filter.add_ext_id(0x18da_f110).unwrap();
    filter.add_ext_range(0x10000, 0x1ffff).unwrap();
    filter.end().unwrap();

    let std_mask = MaskFilter::new(0x100, 0x700);
    let banks: Vec<_> = filter.hw_config().banks().collect();
    assert_eq!(
        banks,
        vec![
            // extended masks are written right away
            (0, Bank::ExtMask(MaskFilter::new(0x10000, 0x1fff_0000))),
            (1, Bank::StdList([1, 2, 3, 1])),
            (2, Bank::StdMask([std_mask, std_mask])),
            (3, Bank::ExtList([0x18da_f110, 0x18da_f110])),
        ]
    );

    let blob = filter.config();
    assert_eq!(BxcanConfig::from_bytes(&blob), Some(*filter.hw_config()));
    assert_eq!(BxcanConfig::from_bytes(&blob[1..]), None);
}

#[test]
fn test_bxcan_reversed_range() {
    let mut a = bxcan();
    a.add_std_range(0x100, 0x1ff).unwrap();
    a.end().unwrap();

    let mut b = bxcan();
    b.add_std_range(0x1ff, 0x100).unwrap();
    b.end().unwrap();

    assert_eq!(a.config(), b.config());
}

#[test]
fn test_bxcan_invalid_parameter() {
    let mut filter = bxcan();
    assert_eq!(filter.add_std_range(0, 0x800), Err(FilterError::InvalidParameter));
    assert_eq!(filter.add_std_range(0x800, 0), Err(FilterError::InvalidParameter));
    assert_eq!(filter.add_std_id(0x800), Err(FilterError::InvalidParameter));
    assert_eq!(filter.add_ext_id(0x2000_0000), Err(FilterError::InvalidParameter));
    assert_eq!(
        filter.add_ext_range(0, 0x2000_0000),
        Err(FilterError::InvalidParameter)
    );
    filter.end().unwrap();
    assert_eq!(filter.banks_used(), 0);
}

#[test]
fn test_bxcan_std_id_capacity() {
    let mut filter = bxcan();
    for id in 0..56 {
        filter.add_std_id(id).unwrap();
    }
    filter.end().unwrap();
    assert_eq!(filter.banks_used(), BXCAN_BANKS);
    assert_eq!(filter.hw_config().fa1r, 0x3fff);

    filter.begin();
    for id in 0..57 {
        // the 57th id only waits for partners
        filter.add_std_id(id).unwrap();
    }
    let before = filter.config();
    assert_eq!(filter.end(), Err(FilterError::CapacityExhausted));
    assert_eq!(filter.config(), before);
}

#[test]
fn test_bxcan_ext_mask_capacity() {
    let mut filter = bxcan();
    for k in 1..=14 {
        let base = k << 16;
        filter.add_ext_range(base, base + 0xffff).unwrap();
    }
    assert_eq!(filter.banks_used(), BXCAN_BANKS);

    let before = filter.config();
    assert_eq!(
        filter.add_ext_range(15 << 16, (15 << 16) + 0xffff),
        Err(FilterError::CapacityExhausted)
    );
    assert_eq!(filter.config(), before);
}

#[test]
fn test_bxcan_full_leaves_pending_alone() {
    let mut filter = bxcan();
    for k in 1..=14 {
        filter.add_ext_range(k << 16, (k << 16) + 0xffff).unwrap();
    }

    // first mask waits for a partner, the second one needs a bank
    filter.add_std_range(0x10, 0x13).unwrap();
    let before = filter.config();
    assert_eq!(
        filter.add_std_range(0x20, 0x23),
        Err(FilterError::CapacityExhausted)
    );
    assert_eq!(filter.config(), before);
    assert_eq!(filter.end(), Err(FilterError::CapacityExhausted));
}

#[test]
fn test_bxcan_replay_is_identical() {
    fn fill(filter: &mut Bxcan) {
        filter.begin();
        filter.add_std_id(0x7ff).unwrap();
        filter.add_std_range(0x123, 0x456).unwrap();
        filter.add_ext_id(0x18da_f110).unwrap();
        filter.add_ext_range(0x1000, 0x2fff).unwrap();
        filter.end().unwrap();
    }

    let mut filter = Bxcan::new();
    fill(&mut filter);
    let first = filter.config();
    fill(&mut filter);
    assert_eq!(filter.config(), first);
}

#[test]
fn test_bxcan_fifo1() {
    let mut filter = Bxcan::new().with_fifo(RxFifo::Fifo1);
    filter.begin();
    filter.add_std_id(0x10).unwrap();
    filter.add_ext_range(0x10000, 0x1ffff).unwrap();
    filter.end().unwrap();

    assert_eq!(filter.hw_config().ffa1r, 0b11);
}

#[test]
fn test_bxcan_allow_all() {
    let mut filter = bxcan();
    filter.allow_all().unwrap();
    filter.end().unwrap();

    let hw = filter.hw_config();
    assert_eq!(hw.active_banks(), 2);
    assert!(hw.accepts(0, Domain::Standard));
    assert!(hw.accepts(SFF_MASK, Domain::Standard));
    assert!(hw.accepts(0x1234_5678, Domain::Extended));
    assert!(hw.accepts(EFF_MASK, Domain::Extended));
}

#[test]
fn test_bxcan_register_dump() {
    let mut filter = bxcan();
    filter.add_std_id(0x55).unwrap();
    filter.end().unwrap();

    let dump = format!("{:X}", filter);
    assert!(dump.contains("FA1R:  0x00000001"));
    assert!(dump.contains("bank[ 0]: fr1: 0x0AA00AA0 fr2: 0x0AA00AA0"));
}

#[test]
fn test_bxcan_bank_index_out_of_range() {
    let mut hw = BxcanConfig::new();
    hw.fa1r = u32::max_value();

    assert!(hw.is_active(13));
    assert!(!hw.is_active(14));
    assert!(!hw.is_active(40));
    assert_eq!(hw.bank(40), None);
    assert_eq!(hw.active_banks(), 14);
}

#[test]
fn test_fdcan_blob_lengths() {
    assert_eq!(FdcanConfig::<28, 8>::LEN, 180);
    assert_eq!(FdcanConfig::<128, 64>::LEN, 1028);
    assert_eq!(BxcanConfig::LEN, 132);

    let g0 = g0();
    assert_eq!(g0.config().len(), 180);
    assert_eq!(g0.config()[0], 1);

    let mut h7 = FdcanH7::new();
    h7.begin();
    assert_eq!(h7.config().len(), 1028);
    assert_eq!(h7.config()[0], 2);
}

#[test]
fn test_fdcan_dual_id() {
    let mut filter = g0();
    filter.add_std_id(0x100).unwrap();
    assert_eq!(filter.hw_config().std_count, 0);
    filter.add_std_id(0x101).unwrap();

    let hw = filter.hw_config();
    assert_eq!(hw.std_count, 1);
    assert_eq!(hw.std_filters[0], 0x4900_0101);
    assert_eq!(
        hw.std_element(0),
        Some(Element {
            kind: FilterType::Dual,
            routing: Routing::Fifo0,
            id1: 0x100,
            id2: 0x101,
        })
    );

    let blob = filter.config();
    assert_eq!(&blob[0..4], &[1, 1, 0, 0]);
    assert_eq!(&blob[4..8], &[0x01, 0x01, 0x00, 0x49]);
}

#[test]
fn test_fdcan_range() {
    let mut filter = g0();
    filter.add_std_range(0x2ff, 0x200).unwrap();

    let hw = filter.hw_config();
    assert_eq!(hw.std_filters[0], 0x0a00_02ff);
    assert!(hw.accepts(0x250, Domain::Standard));
    assert!(!hw.accepts(0x300, Domain::Standard));
    assert!(!hw.accepts(0x250, Domain::Extended));
}

#[test]
fn test_fdcan_lone_ext_id_is_duplicated() {
    let mut filter = g0();
    filter.add_ext_id(0x18da_f110).unwrap();
    filter.end().unwrap();

    let hw = filter.hw_config();
    assert_eq!(hw.ext_count, 1);
    assert_eq!(
        hw.ext_filters[0],
        (1u64 << 61) | (0x18da_f110u64 << 32) | (1u64 << 30) | 0x18da_f110
    );
    assert_eq!(
        hw.ext_element(0),
        Some(Element {
            kind: FilterType::Dual,
            routing: Routing::Fifo0,
            id1: 0x18da_f110,
            id2: 0x18da_f110,
        })
    );

    // extended elements start after all 28 standard slots
    let blob = filter.config();
    assert_eq!(blob[2], 1);
    assert_eq!(&blob[116..124], &hw.ext_filters[0].to_le_bytes());
}

#[test]
fn test_fdcan_invalid_parameter() {
    let mut filter = g0();
    assert_eq!(filter.add_std_id(0x800), Err(FilterError::InvalidParameter));
    assert_eq!(filter.add_std_range(0, 0x800), Err(FilterError::InvalidParameter));
    assert_eq!(filter.add_ext_id(0x2000_0000), Err(FilterError::InvalidParameter));
    assert_eq!(
        filter.add_ext_range(0x2000_0000, 0),
        Err(FilterError::InvalidParameter)
    );
    filter.end().unwrap();
    assert_eq!(filter.hw_config().std_count, 0);
    assert_eq!(filter.hw_config().ext_count, 0);
}

#[test]
fn test_fdcan_g0_capacity() {
    let mut filter = g0();
    for i in 0..28 {
        filter.add_std_range(i * 0x10, i * 0x10 + 0xf).unwrap();
    }
    for i in 0..8 {
        filter.add_ext_range(i << 16, (i << 16) + 0xffff).unwrap();
    }

    let before = filter.config();
    assert_eq!(filter.add_std_range(0x700, 0x7ff), Err(FilterError::CapacityExhausted));
    assert_eq!(filter.add_ext_range(0x100000, 0x1fffff), Err(FilterError::CapacityExhausted));
    assert_eq!(filter.config(), before);
}

#[test]
fn test_fdcan_g0_id_capacity() {
    let mut filter = g0();
    for id in 0..56 {
        filter.add_std_id(id).unwrap();
    }
    filter.end().unwrap();
    assert_eq!(filter.hw_config().std_count, 28);

    filter.begin();
    for id in 0..56 {
        filter.add_std_id(id).unwrap();
    }
    filter.add_std_id(56).unwrap();
    let before = filter.config();
    assert_eq!(filter.end(), Err(FilterError::CapacityExhausted));
    assert_eq!(filter.config(), before);
}

#[test]
fn test_fdcan_h7_capacity() {
    let mut filter = FdcanH7::new();
    filter.begin();
    for id in 0..128 {
        filter.add_std_range(id, id).unwrap();
    }
    assert_eq!(filter.add_std_range(0x7ff, 0x7ff), Err(FilterError::CapacityExhausted));

    for i in 0..64 {
        filter.add_ext_range(0x1000 + i, 0x1000 + i).unwrap();
    }
    assert_eq!(filter.add_ext_range(0, 1), Err(FilterError::CapacityExhausted));

    let hw = filter.hw_config();
    assert_eq!(hw.std_count, 128);
    assert_eq!(hw.ext_count, 64);
}

#[test]
fn test_fdcan_largest_capacity() {
    let mut filter: Fdcan<255, 255, DEV_FDCAN_H7> = Fdcan::new();
    filter.begin();
    for id in 0..255 {
        filter.add_std_range(id, id).unwrap();
        filter.add_ext_range(id, id).unwrap();
    }
    assert_eq!(filter.add_std_range(0x7ff, 0x7ff), Err(FilterError::CapacityExhausted));
    assert_eq!(filter.add_ext_range(0x7ff, 0x7ff), Err(FilterError::CapacityExhausted));

    let hw = filter.hw_config();
    assert_eq!(hw.std_count, 255);
    assert_eq!(hw.ext_count, 255);
    assert_eq!(hw.std_element(254).map(|e| e.id1), Some(254));

    let blob = filter.config();
    assert_eq!(blob.len(), 4 + 4 * 255 + 8 * 255);
    assert_eq!(&blob[..4], &[2, 255, 255, 0]);
    assert_eq!(FdcanConfig::<255, 255>::from_bytes(&blob).as_ref(), Some(hw));
}

#[test]
fn test_fdcan_decode_rejects_bad_blobs() {
    let mut filter = g0();
    filter.add_std_range(0x100, 0x1ff).unwrap();
    let mut blob = filter.config();
    assert_eq!(&blob[4..8], &[0xff, 0x01, 0x00, 0x09]);

    assert_eq!(FdcanConfig::<28, 8>::from_bytes(&blob[..179]), None);
    blob[1] = 29;
    assert_eq!(FdcanConfig::<28, 8>::from_bytes(&blob), None);
}

#[test]
fn test_fdcan_replay_and_decode() {
    let mut filter = FdcanG0::new().with_fifo(RxFifo::Fifo1);
    let run = |filter: &mut FdcanG0| {
        filter.begin();
        filter.add_std_id(0x10).unwrap();
        filter.add_std_range(0x100, 0x1ff).unwrap();
        filter.add_ext_id(0x1000).unwrap();
        filter.end().unwrap();
        filter.config()
    };

    let first = run(&mut filter);
    assert_eq!(run(&mut filter), first);

    let decoded = FdcanConfig::<28, 8>::from_bytes(&first).unwrap();
    assert_eq!(&decoded, filter.hw_config());
    assert_eq!(decoded.std_element(0).map(|e| e.routing), Some(Routing::Fifo1));
    assert_eq!(decoded.std_element(2), None);
    assert!(decoded.accepts(0x10, Domain::Standard));
    assert!(decoded.accepts(0x1000, Domain::Extended));

    let text = filter.to_string();
    assert!(text.contains("sf[ 0]: range 0x100 0x1ff fifo1"));
    assert!(text.contains("sf[ 1]: dual 0x010 0x010 fifo1"));
}

#[test]
fn test_element_classic_and_disabled() {
    let classic = Element {
        kind: FilterType::Classic,
        routing: Routing::Fifo0,
        id1: 0x100,
        id2: 0x700,
    };
    assert!(classic.accepts(0x1ab));
    assert!(!classic.accepts(0x200));
    assert_eq!(Element::from_std(classic.to_std()), classic);

    let rejected = Element {
        routing: Routing::Reject,
        ..classic
    };
    assert!(!rejected.accepts(0x1ab));
}

#[test]
fn test_controller_names() {
    assert_eq!("bxcan".parse::<Controller>(), Ok(Controller::Bxcan));
    assert_eq!("fdcan_g0".parse::<Controller>(), Ok(Controller::FdcanG0));
    assert_eq!("fdcan_h7".parse::<Controller>(), Ok(Controller::FdcanH7));
    assert_eq!(
        "mcp2515".parse::<Controller>(),
        Err(UnknownController("mcp2515".to_owned()))
    );
    assert_eq!(Controller::FdcanG0.to_string(), "fdcan_g0");

    for (controller, len) in &[
        (Controller::Bxcan, 132),
        (Controller::FdcanG0, 180),
        (Controller::FdcanH7, 1028),
    ] {
        let engine = controller.engine();
        assert_eq!(engine.controller(), *controller);
        let blob = engine.config();
        assert_eq!(blob.len(), *len);
        assert_eq!(blob[0], controller.tag());
    }
}

#[test]
fn test_program_hands_over_config() {
    let mut filter = Controller::FdcanG0.engine();
    filter.add_std_id(0x123).unwrap();
    filter.end().unwrap();

    let mut sent = Vec::new();
    let mut transport = |config: &[u8]| {
        sent = config.to_vec();
        true
    };
    assert_eq!(filter.program(&mut transport), Ok(()));
    assert_eq!(sent, filter.config());
    assert_eq!(filter.config_hex(), hex::encode(&sent));

    let mut broken = |_: &[u8]| false;
    assert_eq!(filter.program(&mut broken), Err(FilterError::PlatformFailure));
}

#[test]
fn test_parse_list() {
    assert_eq!(
        parse_list("0x100,256,0x200-0x2FF"),
        Ok(vec![
            FilterRequest::Id(0x100),
            FilterRequest::Id(256),
            FilterRequest::Range(0x200, 0x2ff),
        ])
    );
    assert_eq!(parse_list(""), Ok(vec![]));
    assert_eq!(parse_list("010,0"), Ok(vec![FilterRequest::Id(8), FilterRequest::Id(0)]));
    assert_eq!(parse_list("1,"), Ok(vec![FilterRequest::Id(1)]));
    assert_eq!(parse_list("0X1fffffff"), Ok(vec![FilterRequest::Id(EFF_MASK)]));
}

#[test]
fn test_parse_list_errors() {
    assert_eq!(parse_list("0x"), Err(ParseError::MissingNumber(0)));
    assert_eq!(parse_list("1-"), Err(ParseError::MissingNumber(2)));
    assert_eq!(parse_list("0x100;"), Err(ParseError::UnexpectedChar(';', 5)));
    assert_eq!(parse_list("08"), Err(ParseError::UnexpectedChar('8', 1)));
    assert_eq!(parse_list("1,99999999999"), Err(ParseError::Overflow(2)));
}

#[test]
fn test_request_domain() {
    assert_eq!(FilterRequest::Id(0x7ff).domain(), Domain::Standard);
    assert_eq!(FilterRequest::Id(0x800).domain(), Domain::Extended);
    assert_eq!(FilterRequest::Range(0x100, 0x7ff).domain(), Domain::Standard);
    assert_eq!(FilterRequest::Range(0x100, 0x800).domain(), Domain::Extended);
    assert_eq!(FilterRequest::Range(0x800, 0x100).domain(), Domain::Extended);
}

#[test]
fn test_add_list() {
    let mut filter = bxcan();
    assert_eq!(filter.add_list("0x10,0x20,0x30,0x40"), Ok(4));
    assert_eq!(filter.banks_used(), 1);

    assert_eq!(
        filter.add_list("0x10,zz"),
        Err(ListError::Parse(ParseError::MissingNumber(5)))
    );
    assert_eq!(
        filter.add_list("0x20000000"),
        Err(ListError::Filter(FilterError::InvalidParameter))
    );
}

#[test]
fn test_error_codes() {
    for e in &[
        FilterError::InvalidParameter,
        FilterError::CapacityExhausted,
        FilterError::PlatformFailure,
    ] {
        assert_eq!(FilterError::try_from(e.code()), Ok(*e));
    }
    assert_eq!(FilterError::try_from(0), Err(UnknownErrorCode(0)));
    assert_eq!(
        FilterError::CapacityExhausted.to_string(),
        "no more filter banks available"
    );
}
