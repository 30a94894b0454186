use diesel::prelude::*;

use super::schema::sa_coverages;
use crate::models::{Coverage, CoverageKey, NewCoverage};

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = sa_coverages)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CoverageRow {
    pub index: i64,
    pub gbg: String,
    pub country: String,
    pub shortname: String,
    pub motion: String,
    pub ipsbuild: String,
    pub tpsservice: String,
    pub covered: String,
}

impl From<CoverageRow> for Coverage {
    fn from(row: CoverageRow) -> Self {
        Coverage {
            index: CoverageKey::new(row.index),
            gbg: row.gbg,
            country: row.country,
            shortname: row.shortname,
            motion: row.motion,
            ipsbuild: row.ipsbuild,
            tpsservice: row.tpsservice,
            covered: row.covered,
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = sa_coverages)]
pub struct NewCoverageRow {
    pub gbg: String,
    pub country: String,
    pub shortname: String,
    pub motion: String,
    pub ipsbuild: String,
    pub tpsservice: String,
    pub covered: String,
}

impl From<NewCoverage> for NewCoverageRow {
    fn from(new: NewCoverage) -> Self {
        NewCoverageRow {
            gbg: new.gbg,
            country: new.country,
            shortname: new.shortname,
            motion: new.motion,
            ipsbuild: new.ipsbuild,
            tpsservice: new.tpsservice,
            covered: new.covered,
        }
    }
}
