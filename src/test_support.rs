// Shared fixtures for unit tests

use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::contact::ContactRecord;
use crate::reference::LookupTable;

pub const TEST_CTY: &str = "\
United States:            05:  08:  NA:   37.53:    91.67:     5.0:  K:
    AA,AB,AC,AD,AE,AF,AG,AI,AJ,AK,K,N,W,=K4XYZ(4)[8],=W1AW/KH6;
Canada:                   05:  09:  NA:   44.35:    78.75:     5.0:  VE:
    CF,CG,CJ,CK,CY,CZ,VA,VB,VC,VD,VE,VG,VO,VX,VY,XJ,XK,XL,XM,XN,XO;
Guantanamo Bay:           08:  11:  NA:   20.00:    75.00:     5.0:  KG4:
    KG4,=KG4AA,=KG4AB;
Hawaii:                   31:  61:  OC:   21.12:   157.48:    10.0:  KH6:
    AH6,AH7,KH6,KH7,NH6,NH7,WH6,WH7;
British Virgin Islands:   08:  11:  NA:   18.43:    64.62:     4.0:  VP2V:
    VP2V;
Luxembourg:               14:  27:  EU:   50.00:    -6.00:    -1.0:  LX:
    LX;
Germany:                  14:  28:  EU:   51.00:   -10.00:    -1.0:  DL:
    DA,DB,DC,DD,DE,DF,DG,DH,DI,DJ,DK,DL,DM,DN,DO,DP,DQ,DR;
Ecuador:                  10:  12:  SA:   -1.40:    78.40:     5.0:  HC:
    HC,HD;
Galapagos Islands:        10:  12:  SA:   -0.78:    91.03:     6.0:  HC8:
    HC8,HD8;
European Russia:          16:  29:  EU:   53.65:   -41.37:    -3.0:  UA:
    R,U;
Italy:                    15:  28:  EU:   42.82:   -12.58:    -1.0:  I:
    I;
Sicily:                   15:  28:  EU:   37.50:   -14.00:    -1.0:  *IT9:
    IT9,IW9;
Franz Josef Land:         40:  75:  EU:   80.68:   -49.92:    -3.0:  R1F:
    R1F;
";

pub fn table() -> LookupTable {
    LookupTable::from_cty_str(TEST_CTY).unwrap()
}

/// Start of the test contest weekend
pub fn contest_start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 25, 0, 0, 0).unwrap()
}

/// `minutes` after the contest start
pub fn at(minutes: i64) -> DateTime<Utc> {
    contest_start() + Duration::minutes(minutes)
}

pub fn qso(call: &str, minutes: i64, freq_khz: f64) -> ContactRecord {
    ContactRecord::new(call, "20m", "CW", at(minutes), Some(freq_khz))
}

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
