//! SQL text for the registry datasets: destination DDL for the RNE-sourced
//! tables, the headquarters-only replace statement, and the two-pass RNE
//! enrichment queries. Table and index names are stable identifiers consumed
//! by downstream search/export steps.

/// Alias under which the RNE database file is attached to the SIRENE
/// connection.
pub const RNE_ALIAS: &str = "db_rne";

pub const CREATE_TABLE_DIRIGEANT_PP: &str = "
    CREATE TABLE dirigeant_pp
    (
        siren TEXT,
        date_mise_a_jour TEXT,
        date_de_naissance TEXT,
        role TEXT,
        nom TEXT,
        nom_usage TEXT,
        prenoms TEXT,
        nationalite TEXT
    )";

pub const CREATE_TABLE_DIRIGEANT_PM: &str = "
    CREATE TABLE dirigeant_pm
    (
        siren TEXT,
        date_mise_a_jour TEXT,
        denomination TEXT,
        siren_dirigeant TEXT,
        role TEXT,
        forme_juridique TEXT
    )";

pub const CREATE_TABLE_BENEFICIAIRE: &str = "
    CREATE TABLE beneficiaire
    (
        siren TEXT,
        date_mise_a_jour TEXT,
        date_de_naissance TEXT,
        nom TEXT,
        nom_usage TEXT,
        prenoms TEXT,
        nationalite TEXT
    )";

/// Re-derives the headquarters-only establishment table from the
/// establishment flux: keys already present are overwritten in place, new
/// ones are inserted, so the statement is idempotent with no delete/insert
/// choreography.
pub const REPLACE_TABLE_SIRET_SIEGE: &str = "
    REPLACE INTO siretsiege
    (
        siren,
        siret,
        date_creation,
        tranche_effectif_salarie,
        annee_tranche_effectif_salarie,
        date_mise_a_jour,
        activite_principale_registre_metier,
        est_siege,
        numero_voie,
        type_voie,
        libelle_voie,
        code_postal,
        libelle_cedex,
        libelle_commune,
        commune,
        complement_adresse,
        cedex,
        date_debut_activite,
        distribution_speciale,
        etat_administratif_etablissement,
        enseigne_1,
        enseigne_2,
        enseigne_3,
        activite_principale,
        indice_repetition,
        nom_commercial,
        libelle_commune_etranger,
        code_pays_etranger,
        libelle_pays_etranger
    ) SELECT
        a.siren,
        a.siret,
        a.date_creation,
        a.tranche_effectif_salarie,
        a.annee_tranche_effectif_salarie,
        a.date_mise_a_jour,
        a.activite_principale_registre_metier,
        a.est_siege,
        a.numero_voie,
        a.type_voie,
        a.libelle_voie,
        a.code_postal,
        a.libelle_cedex,
        a.libelle_commune,
        a.commune,
        a.complement_adresse,
        a.cedex,
        a.date_debut_activite,
        a.distribution_speciale,
        a.etat_administratif_etablissement,
        a.enseigne_1,
        a.enseigne_2,
        a.enseigne_3,
        a.activite_principale,
        a.indice_repetition,
        a.nom_commercial,
        a.libelle_commune_etranger,
        a.code_pays_etranger,
        a.libelle_pays_etranger
    FROM flux_siret a LEFT JOIN siretsiege b
    ON a.siret = b.siret
    WHERE a.est_siege = 'true'";

/// Update pass of the RNE enrichment: refreshes identity fields of legal
/// units that exist in both registries. Units with no RNE match are left
/// unchanged.
pub const UPDATE_UNITE_LEGALE_FROM_RNE: &str = "
    UPDATE unite_legale
    SET (denomination, nom, prenom, date_mise_a_jour_rne) =
        (SELECT ul.denomination, ul.nom, ul.prenom, ul.date_mise_a_jour
         FROM db_rne.unites_legales ul
         WHERE ul.siren = unite_legale.siren)
    WHERE siren IN (SELECT siren FROM db_rne.unites_legales)";

/// Insert-remainder pass of the RNE enrichment: legal units known only to
/// the RNE. `INSERT OR IGNORE` makes a key that already landed through the
/// update pass a silent skip instead of a duplicate-key failure.
pub const INSERT_REMAINING_RNE_UNITE_LEGALE: &str = "
    INSERT OR IGNORE INTO unite_legale
        (siren, denomination, nom, prenom, date_mise_a_jour_rne, from_rne)
    SELECT ul.siren, ul.denomination, ul.nom, ul.prenom, ul.date_mise_a_jour, 'true'
    FROM db_rne.unites_legales ul
    WHERE ul.siren NOT IN (SELECT siren FROM unite_legale)";
