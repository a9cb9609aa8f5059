// @generated-by-hand: kept alongside migrations/ rather than produced by
// `diesel print-schema`, since the warehouse tables are authored directly
// (see migrations/2024-01-01-000000_finsight_star_schema/up.sql).

diesel::table! {
    dim_companies (id) {
        id -> Uuid,
        #[max_length = 16]
        ticker -> Varchar,
        legal_name -> Varchar,
        #[max_length = 10]
        cik -> Varchar,
        sector -> Nullable<Varchar>,
        industry -> Nullable<Varchar>,
        country -> Nullable<Varchar>,
        #[max_length = 16]
        primary_accounting_standard -> Varchar,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    dim_concepts (id) {
        id -> Uuid,
        concept_name -> Varchar,
        #[max_length = 32]
        taxonomy -> Varchar,
        #[max_length = 16]
        balance_type -> Nullable<Varchar>,
        #[max_length = 16]
        period_type -> Varchar,
        data_type -> Nullable<Varchar>,
        is_abstract -> Bool,
        #[max_length = 32]
        statement_type -> Nullable<Varchar>,
        normalized_label -> Varchar,
        preferred_label -> Nullable<Varchar>,
        hierarchy_level -> Nullable<Int4>,
        parent_concept_id -> Nullable<Uuid>,
        calculation_weight -> Nullable<Int4>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    dim_time_periods (id) {
        id -> Uuid,
        #[max_length = 16]
        period_type -> Varchar,
        instant_date -> Nullable<Date>,
        start_date -> Nullable<Date>,
        end_date -> Nullable<Date>,
        fiscal_year -> Int4,
        fiscal_quarter -> Nullable<Int4>,
        period_label -> Nullable<Varchar>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    dim_filings (id) {
        id -> Uuid,
        company_id -> Uuid,
        #[max_length = 16]
        filing_type -> Varchar,
        fiscal_year_end -> Date,
        filing_date -> Date,
        #[max_length = 32]
        accession_number -> Varchar,
        source_url -> Varchar,
        extraction_timestamp -> Timestamptz,
        validation_score -> Nullable<Float8>,
        completeness_score -> Nullable<Float8>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    dim_xbrl_dimensions (id) {
        id -> Uuid,
        #[max_length = 32]
        dimension_hash -> Varchar,
        dimension_json -> Jsonb,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    fact_generic (id) {
        id -> Uuid,
        filing_id -> Uuid,
        company_id -> Uuid,
        concept_id -> Uuid,
        period_id -> Uuid,
        dimension_id -> Nullable<Uuid>,
        value_numeric -> Nullable<Float8>,
        value_text -> Nullable<Text>,
        unit -> Nullable<Varchar>,
        decimals -> Nullable<Int4>,
        scale -> Nullable<Int4>,
        #[max_length = 64]
        context_id -> Nullable<Varchar>,
        #[max_length = 64]
        xbrl_fact_id -> Nullable<Varchar>,
        source_line -> Nullable<Int4>,
        order_index -> Int4,
        is_primary -> Bool,
        is_calculated -> Bool,
        #[max_length = 32]
        extraction_method -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    calc_rel (id) {
        id -> Uuid,
        filing_id -> Uuid,
        parent_concept_id -> Uuid,
        child_concept_id -> Uuid,
        weight -> Float8,
        order_index -> Int4,
        #[max_length = 16]
        source -> Varchar,
        is_synthetic -> Bool,
        confidence -> Float8,
    }
}

diesel::table! {
    pres_rel (id) {
        id -> Uuid,
        filing_id -> Uuid,
        parent_concept_id -> Uuid,
        child_concept_id -> Uuid,
        order_index -> Int4,
        role_uri -> Varchar,
        #[max_length = 32]
        statement_type -> Nullable<Varchar>,
        #[max_length = 16]
        source -> Varchar,
        is_synthetic -> Bool,
    }
}

diesel::table! {
    footnote_ref (id) {
        id -> Uuid,
        filing_id -> Uuid,
        fact_id -> Nullable<Uuid>,
        concept_id -> Nullable<Uuid>,
        text -> Text,
        label -> Nullable<Varchar>,
        role -> Nullable<Varchar>,
        #[max_length = 16]
        lang -> Nullable<Varchar>,
    }
}

diesel::table! {
    statement_item (id) {
        id -> Uuid,
        filing_id -> Uuid,
        concept_id -> Uuid,
        #[max_length = 32]
        statement_type -> Varchar,
        display_order -> Int4,
        is_header -> Bool,
        is_main_item -> Bool,
        role_uri -> Varchar,
        #[max_length = 24]
        side -> Nullable<Varchar>,
    }
}

diesel::table! {
    fact_income_statement (id) {
        id -> Uuid,
        filing_id -> Uuid,
        fact_id -> Uuid,
        concept_id -> Uuid,
        normalized_label -> Varchar,
        value_numeric -> Nullable<Float8>,
        display_order -> Int4,
        is_header -> Bool,
        hierarchy_level -> Int4,
    }
}

diesel::table! {
    fact_balance_sheet (id) {
        id -> Uuid,
        filing_id -> Uuid,
        fact_id -> Uuid,
        concept_id -> Uuid,
        normalized_label -> Varchar,
        value_numeric -> Nullable<Float8>,
        display_order -> Int4,
        is_header -> Bool,
        hierarchy_level -> Int4,
        #[max_length = 24]
        side -> Nullable<Varchar>,
    }
}

diesel::table! {
    fact_cash_flow (id) {
        id -> Uuid,
        filing_id -> Uuid,
        fact_id -> Uuid,
        concept_id -> Uuid,
        normalized_label -> Varchar,
        value_numeric -> Nullable<Float8>,
        display_order -> Int4,
        is_header -> Bool,
        hierarchy_level -> Int4,
    }
}

diesel::table! {
    fact_comprehensive_income (id) {
        id -> Uuid,
        filing_id -> Uuid,
        fact_id -> Uuid,
        concept_id -> Uuid,
        normalized_label -> Varchar,
        value_numeric -> Nullable<Float8>,
        display_order -> Int4,
        is_header -> Bool,
        hierarchy_level -> Int4,
        sign_corrected -> Bool,
    }
}

diesel::table! {
    fact_equity_statement (id) {
        id -> Uuid,
        filing_id -> Uuid,
        fact_id -> Uuid,
        concept_id -> Uuid,
        normalized_label -> Varchar,
        value_numeric -> Nullable<Float8>,
        display_order -> Int4,
        is_header -> Bool,
        hierarchy_level -> Int4,
        #[max_length = 48]
        equity_component -> Nullable<Varchar>,
    }
}

diesel::table! {
    quality_scores (id) {
        id -> Uuid,
        filing_id -> Uuid,
        check_name -> Varchar,
        passed -> Bool,
        #[max_length = 16]
        severity -> Varchar,
        expected -> Nullable<Float8>,
        actual -> Nullable<Float8>,
        difference -> Nullable<Float8>,
        details -> Nullable<Text>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    derived_totals_audit (id) {
        id -> Uuid,
        filing_id -> Uuid,
        concept_id -> Uuid,
        fact_id -> Uuid,
        computed_value -> Float8,
        component_count -> Int4,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    source_documents (id) {
        id -> Uuid,
        #[max_length = 16]
        ticker -> Varchar,
        fiscal_year -> Int4,
        #[max_length = 16]
        filing_type -> Varchar,
        instance_path -> Varchar,
        linkbase_paths -> Jsonb,
        #[max_length = 64]
        content_hash -> Varchar,
        fetched_at -> Timestamptz,
    }
}

diesel::joinable!(dim_filings -> dim_companies (company_id));
diesel::joinable!(fact_generic -> dim_filings (filing_id));
diesel::joinable!(fact_generic -> dim_companies (company_id));
diesel::joinable!(fact_generic -> dim_concepts (concept_id));
diesel::joinable!(fact_generic -> dim_time_periods (period_id));
diesel::joinable!(calc_rel -> dim_filings (filing_id));
diesel::joinable!(pres_rel -> dim_filings (filing_id));
diesel::joinable!(statement_item -> dim_filings (filing_id));
diesel::joinable!(statement_item -> dim_concepts (concept_id));
diesel::joinable!(quality_scores -> dim_filings (filing_id));
diesel::joinable!(derived_totals_audit -> dim_filings (filing_id));
diesel::joinable!(fact_income_statement -> dim_filings (filing_id));
diesel::joinable!(fact_balance_sheet -> dim_filings (filing_id));
diesel::joinable!(fact_cash_flow -> dim_filings (filing_id));
diesel::joinable!(fact_comprehensive_income -> dim_filings (filing_id));
diesel::joinable!(fact_equity_statement -> dim_filings (filing_id));

diesel::allow_tables_to_appear_in_same_query!(
    dim_companies,
    dim_concepts,
    dim_time_periods,
    dim_filings,
    dim_xbrl_dimensions,
    fact_generic,
    calc_rel,
    pres_rel,
    footnote_ref,
    statement_item,
    fact_income_statement,
    fact_balance_sheet,
    fact_cash_flow,
    fact_comprehensive_income,
    fact_equity_statement,
    quality_scores,
    derived_totals_audit,
    source_documents,
);
