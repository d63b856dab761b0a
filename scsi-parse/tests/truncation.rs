// SPDX-License-Identifier: Apache-2.0 OR BSD-3-Clause

//! Truncation-safety property: for any buffer and any prefix of it, every
//! decoder either fails with the too-short error or decodes without ever
//! touching bytes past the prefix. Out-of-range slice access would panic,
//! so driving every decoder over randomized truncation points (and fully
//! consuming every lazy iterator) is the whole test.

use rand::{rngs::StdRng, Rng, RngCore, SeedableRng};

use scsi_parse::{
    capacity::{parse_read_capacity_10, parse_read_capacity_16},
    defect::{parse_read_defect_data_10, parse_read_defect_data_12, DefectEntries},
    diagnostics::parse_receive_diagnostics,
    inquiry::{parse_evpd_page, parse_inquiry},
    log_sense::{parse_log_sense, LogContent},
    mode_sense::{parse_mode_sense_6, parse_mode_sense_10, ModeBody},
    smart::{parse_smart_read_data, SmartTable},
};

fn drain_log_sense(data: &[u8]) {
    if let Ok(log) = parse_log_sense(data) {
        match log.content {
            LogContent::SupportedPages(pages) => {
                pages.iter().for_each(drop);
            }
            LogContent::SupportedSubpages(pairs) => {
                pairs.iter().for_each(drop);
            }
            LogContent::Parameters(params) => {
                for param in params.iter() {
                    drop(param.interpret(log.page_code));
                }
            }
        }
    }
}

fn drain_mode_sense(data: &[u8], ten_byte: bool) {
    let parsed = if ten_byte {
        parse_mode_sense_10(data)
    } else {
        parse_mode_sense_6(data)
    };
    if let Ok(sense) = parsed {
        if let ModeBody::Parsed { pages, .. } = sense.body {
            pages.iter().for_each(drop);
        }
    }
}

fn drain_defects(data: &[u8], twelve_byte: bool) {
    let parsed = if twelve_byte {
        parse_read_defect_data_12(data)
    } else {
        parse_read_defect_data_10(data)
    };
    if let Ok(list) = parsed {
        if let DefectEntries::Addressed(defects) = list.entries {
            defects.iter().for_each(drop);
            let _ = defects.unparsed_trailing();
        }
    }
}

fn drain_all(data: &[u8]) {
    drain_log_sense(data);
    drain_mode_sense(data, false);
    drain_mode_sense(data, true);
    drain_defects(data, false);
    drain_defects(data, true);
    let _ = parse_inquiry(data);
    if let Ok(page) = parse_evpd_page(data) {
        let _ = page.ascii();
    }
    let _ = parse_read_capacity_10(data);
    let _ = parse_read_capacity_16(data);
    let _ = parse_receive_diagnostics(data);
    if let Ok(attrs) = parse_smart_read_data(data) {
        let table = SmartTable::ata_default();
        let _ = table.temperature(&attrs);
        let _ = table.power_on_hours(&attrs);
    }
}

/// A plausible log-sense buffer whose declared lengths intentionally
/// overrun once truncated.
fn log_sense_fixture() -> Vec<u8> {
    let mut buf = vec![
        0x2f, 0x00, 0x00, 0x20, // header declaring 32 bytes of data
    ];
    for code in 0..4u8 {
        buf.extend_from_slice(&[0x00, code, 0x00, 0x04, 0xaa, 0xbb, 0xcc, 0xdd]);
    }
    buf
}

fn mode_sense_fixture() -> Vec<u8> {
    vec![
        0x1f, 0x00, 0x00, 0x08, // mode sense 6 header with block descriptor
        0x00, 0x00, 0x10, 0x00, 0x00, 0x00, 0x02, 0x00, // block descriptor
        0x08, 0x0a, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, // caching page
        0x41, 0x01, 0x00, 0x04, 1, 2, 3, 4, // subpage-format page
    ]
}

fn defect_fixture() -> Vec<u8> {
    let mut buf = vec![0x00, 0b0001_1000, 0x00, 0x28]; // declares 40 bytes
    for lba in 0..6u32 {
        buf.extend_from_slice(&lba.to_be_bytes());
    }
    buf
}

#[test]
fn random_truncation_points_never_overread() {
    let mut rng = StdRng::seed_from_u64(0x5c51);

    let fixtures = [log_sense_fixture(), mode_sense_fixture(), defect_fixture()];
    for fixture in &fixtures {
        // every prefix, exhaustively
        for len in 0..=fixture.len() {
            drain_all(&fixture[..len]);
        }
    }

    // and fully random buffers at random truncation points
    for _ in 0..500 {
        let len = rng.gen_range(0..256);
        let mut buf = vec![0u8; len];
        rng.fill_bytes(&mut buf);
        drain_all(&buf);
    }
}

#[test]
fn decoding_is_idempotent() {
    let fixture = log_sense_fixture();
    let first = parse_log_sense(&fixture).unwrap();
    let second = parse_log_sense(&fixture).unwrap();
    assert_eq!(first, second);

    match (first.content, second.content) {
        (LogContent::Parameters(a), LogContent::Parameters(b)) => {
            let a: Vec<_> = a.iter().collect();
            let b: Vec<_> = b.iter().collect();
            assert_eq!(a, b);
        }
        _ => unreachable!(),
    }
}
