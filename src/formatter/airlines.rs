//! Built-in ICAO to display-code table for airlines.
//!
//! Most entries are the airline's IATA designator. A few regional carriers
//! map to their own short code rather than their mainline partner's.

/// `(ICAO, short code)` pairs loaded by [`CodeMapping::airlines`](super::CodeMapping::airlines).
pub const AIRLINE_CODES: &[(&str, &str)] = &[
    // North America
    ("ENY", "MQ"),
    ("DAL", "DL"),
    ("AAL", "AA"),
    ("UAL", "UA"),
    ("SWA", "WN"),
    ("FLE", "F8"),
    ("WJA", "WS"),
    ("ROU", "RV"),
    ("RPA", "YX"),
    ("ASH", "YV"),
    ("PTR", "PD"),
    ("CHAL", "CL"),
    ("CRQ", "YN"),
    ("HYD", "0Q"),
    ("NRL", "N5"),
    ("FDX", "FX"),
    ("NKS", "NK"),
    ("JZA", "QK"),
    ("ACA", "AC"),
    ("NDL", "MB"),
    ("JBU", "B6"),
    ("MXY", "MX"),
    ("HAL", "HA"),
    ("SKW", "OO"),
    ("EDV", "9E"),
    ("JIA", "OH"),
    ("QXE", "QX"),
    ("CPA", "CX"),
    ("CSB", "2I"),
    // Europe, Middle East, Asia-Pacific, Africa
    ("AFR", "AF"),
    ("BAW", "BA"),
    ("DLH", "LH"),
    ("KLM", "KL"),
    ("UAE", "EK"),
    ("QTR", "QR"),
    ("ETD", "EY"),
    ("SIA", "SQ"),
    ("THY", "TK"),
    ("ANA", "NH"),
    ("JAL", "JL"),
    ("CCA", "CA"),
    ("CES", "MU"),
    ("CSN", "CZ"),
    ("SAS", "SK"),
    ("FIN", "AY"),
    ("TAP", "TP"),
    ("IBE", "IB"),
    ("VIR", "VS"),
    ("ICE", "FI"),
    ("EIN", "EI"),
    ("SWR", "LX"),
    ("AUA", "OS"),
    ("BEL", "SN"),
    ("KAL", "KE"),
    ("AAR", "OZ"),
    ("THA", "TG"),
    ("MAS", "MH"),
    ("QFA", "QF"),
    ("ANZ", "NZ"),
    ("SAA", "SA"),
    ("ETH", "ET"),
    ("MSR", "MS"),
    ("RAM", "AT"),
    ("MEA", "ME"),
    ("RJA", "RJ"),
    ("SVA", "SV"),
    ("GFA", "GF"),
    ("OMA", "WY"),
    ("QNZ", "QF"),
    ("VLM", "VG"),
    ("REP", "YX"),
    ("GWI", "4U"),
    ("EWG", "EW"),
    ("VLG", "VY"),
    ("EZY", "U2"),
    ("RYR", "FR"),
    ("WZZ", "W6"),
    ("VOE", "V7"),
    ("EJU", "EC"),
    ("BEE", "BE"),
    ("LOG", "LM"),
    ("SHT", "BA"),
];
