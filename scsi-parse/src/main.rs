// SPDX-License-Identifier: Apache-2.0 OR BSD-3-Clause

//! Diagnostic CLI: decode a captured SCSI response and print it.
//!
//! Takes the CDB, sense data, and data-in buffer as hex strings (the shape
//! `sg_raw` and bus captures hand you), picks a decoder by the CDB opcode,
//! and renders the decoded values. Byte ranges no decoder understands are
//! dumped as hex, never discarded.

use std::process::exit;

use clap::Parser;
use log::warn;
use thiserror::Error as ThisError;

use scsi_parse::{
    capacity::{parse_read_capacity_10, parse_read_capacity_16},
    defect::{parse_read_defect_data_10, parse_read_defect_data_12, DefectEntries, DefectEntry},
    diagnostics::{parse_receive_diagnostics, DiagnosticContent},
    inquiry::{ascii_field, parse_evpd_page, parse_inquiry},
    log_sense::{parse_log_sense, LogContent, LogParameterValue},
    mode_sense::{parse_mode_sense_6, parse_mode_sense_10, BlockDescriptor, ModeBody, NumBlocks},
    ParseError,
};

#[derive(Debug, ThisError)]
enum Error {
    #[error("odd number of hex digits in {0}")]
    OddHexLength(&'static str),
    #[error("invalid character {1:?} in {0}")]
    BadHexDigit(&'static str, char),
    #[error("empty CDB")]
    EmptyCdb,
    #[error("sense data indicates the command failed; not decoding data")]
    SenseReported,
    #[error("unsupported CDB opcode {0:#04x}")]
    UnsupportedOpcode(u8),
    #[error("decode failed: {0}")]
    Decode(#[from] ParseError),
}

#[derive(Parser)]
struct ParseScsiArgs {
    /// Command descriptor block, as hex digits (whitespace allowed).
    ///
    /// Only the opcode byte is used, to pick the decoder.
    cdb: String,
    /// Sense data returned with the command, as hex. Non-empty sense means
    /// the command failed and the data buffer is not decoded.
    sense: String,
    /// The data-in buffer returned by the device, as hex.
    data: String,
}

fn parse_hex(what: &'static str, text: &str) -> Result<Vec<u8>, Error> {
    let mut out = Vec::new();
    let mut high: Option<u8> = None;
    for ch in text.chars() {
        if ch.is_whitespace() {
            continue;
        }
        let digit = ch
            .to_digit(16)
            .ok_or(Error::BadHexDigit(what, ch))
            .map(|d| d as u8)?;
        match high.take() {
            Some(h) => out.push(h << 4 | digit),
            None => high = Some(digit),
        }
    }
    if high.is_some() {
        return Err(Error::OddHexLength(what));
    }
    Ok(out)
}

fn hex_dump(buf: &[u8]) -> String {
    buf.iter()
        .map(|b| format!("{b:02x}"))
        .collect::<Vec<_>>()
        .join(" ")
}

fn print_unparsed(buf: &[u8]) {
    if !buf.is_empty() {
        println!("Unparsed data: {}", hex_dump(buf));
    }
}

fn yes_no(val: bool) -> &'static str {
    if val {
        "yes"
    } else {
        "no"
    }
}

fn print_log_sense(data: &[u8]) -> Result<(), Error> {
    let log = parse_log_sense(data)?;
    println!("Log Sense Page Code: {:#04x}", log.page_code);
    println!("Log Sense Subpage: {:#04x}", log.subpage_code);
    println!("Log Sense Subpage Format: {}", yes_no(log.subpage_format));
    println!("Log Sense Data Saved: {}", yes_no(log.data_saved));
    println!("Log Sense Data Length: {}", log.data_length);

    match log.content {
        LogContent::SupportedPages(pages) => {
            println!("Supported Log Pages:");
            for page in pages.iter() {
                println!("\t{page:02X}");
            }
        }
        LogContent::SupportedSubpages(pairs) => {
            println!("Supported Log Subpages:");
            for (page, subpage) in pairs.iter() {
                println!("\t{page:02X} {subpage:02X}");
            }
        }
        LogContent::Parameters(params) => {
            for param in params.iter() {
                println!();
                println!("Log Sense Param Code: {:#06x}", param.code);
                println!("Log Sense Param Len: {}", param.data.len());
                match param.interpret(log.page_code) {
                    LogParameterValue::InformationalExceptions {
                        asc,
                        ascq,
                        temperature,
                        unparsed,
                    } => {
                        println!("Informational Exceptions ASC: {asc:02X}");
                        println!("Informational Exceptions ASCQ: {ascq:02X}");
                        println!("Temperature: {temperature}");
                        print_unparsed(unparsed);
                    }
                    LogParameterValue::Unparsed(data) => print_unparsed(data),
                }
            }
        }
    }
    Ok(())
}

fn print_mode_sense(data: &[u8], ten_byte: bool) -> Result<(), Error> {
    let sense = if ten_byte {
        parse_mode_sense_10(data)?
    } else {
        parse_mode_sense_6(data)?
    };
    let variant = if ten_byte { "10" } else { "6" };
    println!("Mode Sense {variant} Data Length: {}", sense.data_length);
    println!("Mode Sense {variant} Medium Type: {}", sense.medium_type);
    println!(
        "Mode Sense {variant} Device Specific Param: {}",
        sense.device_specific
    );
    if ten_byte {
        println!("Mode Sense {variant} Long LBA: {}", yes_no(sense.long_lba));
    }
    println!(
        "Mode Sense {variant} Block Descriptor Length: {}",
        sense.block_descriptor_length
    );

    match sense.body {
        ModeBody::Truncated(rest) => {
            println!("Not enough data to parse full data");
            print_unparsed(rest);
        }
        ModeBody::Parsed {
            block_descriptor,
            pages,
        } => {
            match block_descriptor {
                Some(BlockDescriptor::Standard {
                    density_code,
                    num_blocks,
                    block_length,
                }) => {
                    println!("Density Code: {density_code}");
                    match num_blocks {
                        NumBlocks::Count(count) => println!("Num Blocks: {count}"),
                        NumBlocks::Overflow => println!("Num Blocks: overflow"),
                    }
                    println!("Block Length: {block_length}");
                }
                Some(BlockDescriptor::Unrecognized(raw)) => {
                    println!("Unknown block descriptor");
                    print_unparsed(raw);
                }
                None => {}
            }
            for page in pages.iter() {
                println!();
                println!("Page Code: {:#04x}", page.page_code);
                if let Some(subpage) = page.subpage_code {
                    println!("Subpage Code: {subpage:#04x}");
                }
                println!("Page Saveable: {}", yes_no(page.saveable));
                println!("Page Len: {}", page.data.len());
                print_unparsed(page.data);
            }
        }
    }
    Ok(())
}

fn print_defect_list(data: &[u8], twelve_byte: bool) -> Result<(), Error> {
    let list = if twelve_byte {
        parse_read_defect_data_12(data)?
    } else {
        parse_read_defect_data_10(data)?
    };
    println!("Plist: {}", yes_no(list.plist_valid));
    println!("Glist: {}", yes_no(list.glist_valid));
    println!("Len: {}", list.declared_length);

    match list.entries {
        DefectEntries::Addressed(defects) => {
            println!("Format: {:?}", defects.format);
            for entry in defects.iter() {
                match entry {
                    DefectEntry::Lba(lba) => println!("\t{lba}"),
                    DefectEntry::LongLba(lba) => println!("\t{lba}"),
                    DefectEntry::BytesFromIndex {
                        cylinder,
                        head,
                        bytes_from_index,
                    } => println!("\tC={cylinder} H={head} B={bytes_from_index}"),
                    DefectEntry::Physical {
                        cylinder,
                        head,
                        sector,
                    } => println!("\tC={cylinder} H={head} S={sector}"),
                    DefectEntry::Vendor(word) => println!("\t{word:08x}"),
                }
            }
            print_unparsed(defects.unparsed_trailing());
        }
        DefectEntries::UnknownFormat { code, data } => {
            println!("Format: unknown ({code:#05b})");
            print_unparsed(data);
        }
    }
    Ok(())
}

fn print_inquiry(cdb: &[u8], data: &[u8]) -> Result<(), Error> {
    let evpd = cdb.len() >= 2 && cdb[1] & 1 != 0;
    if evpd {
        let page = parse_evpd_page(data)?;
        println!("Peripheral Qualifier: {}", page.peripheral_qualifier);
        println!("Peripheral Device Type: {}", page.device_type);
        println!("EVPD Page Code: {:#04x}", page.page_code);
        println!("EVPD Data Len: {}", page.declared_length);
        match page.ascii() {
            Some((text, rest)) => {
                println!("ASCII: '{}'", String::from_utf8_lossy(text));
                print_unparsed(rest);
            }
            None => print_unparsed(page.data),
        }
    } else {
        let inq = parse_inquiry(data)?;
        println!("Device Type: {}", inq.device_type);
        println!("Vendor: {}", ascii_field(inq.vendor));
        println!("Model: {}", ascii_field(inq.model));
        println!("FW Revision: {}", ascii_field(inq.revision));
        if let Some(serial) = inq.serial {
            println!("Serial: {}", ascii_field(serial));
        }
    }
    Ok(())
}

fn print_read_capacity_10(data: &[u8]) -> Result<(), Error> {
    let cap = parse_read_capacity_10(data)?;
    println!("Max LBA: {}", cap.max_lba);
    println!("Block Size: {}", cap.block_size);
    if data.len() > 8 {
        print_unparsed(&data[8..]);
    }
    Ok(())
}

fn print_read_capacity_16(data: &[u8]) -> Result<(), Error> {
    let cap = parse_read_capacity_16(data)?;
    println!("Max LBA: {}", cap.max_lba);
    println!("Block Size: {}", cap.block_size);
    println!("Protection Enabled: {}", yes_no(cap.protection_enabled));
    println!("Protection Type: {}", cap.protection_type);
    println!("P_I Exponent: {}", cap.p_i_exponent);
    println!(
        "Logical Blocks Per Physical Block Exponent: {}",
        cap.logical_per_physical_exponent
    );
    println!(
        "Thin Provisioning Enabled: {}",
        yes_no(cap.thin_provisioning_enabled)
    );
    println!(
        "Thin Provisioning Zero: {}",
        yes_no(cap.thin_provisioning_zero)
    );
    println!("Lowest Aligned LBA: {}", cap.lowest_aligned_lba);
    Ok(())
}

fn print_receive_diagnostics(data: &[u8]) -> Result<(), Error> {
    let page = parse_receive_diagnostics(data)?;
    println!("Page Code: {:#04x}", page.page_code);
    println!("Page Code Specific: {:#04x}", page.page_code_specific);
    println!("Len: {}", page.declared_length);
    match page.content {
        DiagnosticContent::SupportedPages(pages) => {
            println!("Supported Diagnostic Pages:");
            for page in pages {
                println!("\t{page:#04x}");
            }
        }
        DiagnosticContent::Unparsed(data) => print_unparsed(data),
    }
    Ok(())
}

fn run(args: &ParseScsiArgs) -> Result<(), Error> {
    let cdb = parse_hex("cdb", &args.cdb)?;
    let sense = parse_hex("sense", &args.sense)?;
    let data = parse_hex("data", &args.data)?;

    let opcode = *cdb.first().ok_or(Error::EmptyCdb)?;

    if !sense.is_empty() {
        warn!("Sense bytes: {}", hex_dump(&sense));
        return Err(Error::SenseReported);
    }

    match opcode {
        0x4d => print_log_sense(&data),
        0x1a => print_mode_sense(&data, false),
        0x5a => print_mode_sense(&data, true),
        0x37 => print_defect_list(&data, false),
        0xb7 => print_defect_list(&data, true),
        0x12 => print_inquiry(&cdb, &data),
        0x25 => print_read_capacity_10(&data),
        0x9e => print_read_capacity_16(&data),
        0x1c => print_receive_diagnostics(&data),
        other => {
            print_unparsed(&data);
            Err(Error::UnsupportedOpcode(other))
        }
    }
}

fn main() {
    env_logger::init();
    let args = ParseScsiArgs::parse();
    if let Err(e) = run(&args) {
        eprintln!("{e}");
        exit(1);
    }
}
