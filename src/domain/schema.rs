use serde::Serialize;
use std::fmt;

/// 欄位的語意型別，決定 coercion 的方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Currency,
    Date,
    Text,
}

/// Known obligo ledger columns, in declared schema order.
///
/// `Ord` follows declaration order, so a `BTreeMap<CanonicalColumn, _>`
/// iterates in the same order as the schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum CanonicalColumn {
    #[serde(rename = "No.")]
    No,
    #[serde(rename = "No. Loan")]
    NoLoan,
    #[serde(rename = "Nama Proyek")]
    NamaProyek,
    #[serde(rename = "Nomor Kontrak/PO/SPK")]
    NomorKontrak,
    #[serde(rename = "Bowheer")]
    Bowheer,
    #[serde(rename = "Nilai Kontrak / Proyek")]
    NilaiKontrak,
    #[serde(rename = "Jatuh Tempo Kontrak")]
    JatuhTempoKontrak,
    #[serde(rename = "Total Pencairan (Rp)")]
    TotalPencairan,
    #[serde(rename = "Jatuh Tempo Fasilitas")]
    JatuhTempoFasilitas,
    #[serde(rename = "Baki Debet (Rp)")]
    BakiDebet,
    #[serde(rename = "Keterangan")]
    Keterangan,
    #[serde(rename = "Progress")]
    Progress,
    #[serde(rename = "Tanggal Kredit")]
    TanggalKredit,
    #[serde(rename = "Nominal Kredit")]
    NominalKredit,
}

impl CanonicalColumn {
    pub const ALL: [CanonicalColumn; 14] = [
        CanonicalColumn::No,
        CanonicalColumn::NoLoan,
        CanonicalColumn::NamaProyek,
        CanonicalColumn::NomorKontrak,
        CanonicalColumn::Bowheer,
        CanonicalColumn::NilaiKontrak,
        CanonicalColumn::JatuhTempoKontrak,
        CanonicalColumn::TotalPencairan,
        CanonicalColumn::JatuhTempoFasilitas,
        CanonicalColumn::BakiDebet,
        CanonicalColumn::Keterangan,
        CanonicalColumn::Progress,
        CanonicalColumn::TanggalKredit,
        CanonicalColumn::NominalKredit,
    ];

    pub const REQUIRED: [CanonicalColumn; 6] = [
        CanonicalColumn::NamaProyek,
        CanonicalColumn::TotalPencairan,
        CanonicalColumn::BakiDebet,
        CanonicalColumn::NominalKredit,
        CanonicalColumn::JatuhTempoKontrak,
        CanonicalColumn::JatuhTempoFasilitas,
    ];

    /// Label exactly as it appears in a well-formed export.
    pub fn label(self) -> &'static str {
        match self {
            CanonicalColumn::No => "No.",
            CanonicalColumn::NoLoan => "No. Loan",
            CanonicalColumn::NamaProyek => "Nama Proyek",
            CanonicalColumn::NomorKontrak => "Nomor Kontrak/PO/SPK",
            CanonicalColumn::Bowheer => "Bowheer",
            CanonicalColumn::NilaiKontrak => "Nilai Kontrak / Proyek",
            CanonicalColumn::JatuhTempoKontrak => "Jatuh Tempo Kontrak",
            CanonicalColumn::TotalPencairan => "Total Pencairan (Rp)",
            CanonicalColumn::JatuhTempoFasilitas => "Jatuh Tempo Fasilitas",
            CanonicalColumn::BakiDebet => "Baki Debet (Rp)",
            CanonicalColumn::Keterangan => "Keterangan",
            CanonicalColumn::Progress => "Progress",
            CanonicalColumn::TanggalKredit => "Tanggal Kredit",
            CanonicalColumn::NominalKredit => "Nominal Kredit",
        }
    }

    /// Exact, case-sensitive lookup. No whitespace or punctuation folding.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|column| column.label() == label)
    }

    pub fn kind(self) -> ColumnKind {
        match self {
            CanonicalColumn::NilaiKontrak
            | CanonicalColumn::TotalPencairan
            | CanonicalColumn::BakiDebet
            | CanonicalColumn::NominalKredit => ColumnKind::Currency,
            CanonicalColumn::JatuhTempoKontrak
            | CanonicalColumn::JatuhTempoFasilitas
            | CanonicalColumn::TanggalKredit => ColumnKind::Date,
            _ => ColumnKind::Text,
        }
    }

    pub fn is_required(self) -> bool {
        Self::REQUIRED.contains(&self)
    }
}

impl fmt::Display for CanonicalColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Label of the derived balance column; never part of the source vocabulary.
pub const SALDO_KREDIT_LABEL: &str = "Saldo Kredit";
