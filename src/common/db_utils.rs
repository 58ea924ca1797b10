// src/common/db_utils.rs

// ---
// Normalização de Paginação
// ---
// Toda listagem paginada passa por aqui antes de montar LIMIT/OFFSET.
// Página além do fim satura o deslocamento em vez de estourar a conta;
// o banco só devolve uma página vazia.
pub(crate) fn page_window(page: i64, per_page: i64) -> (i64, i64, i64) {
    let page = page.max(1);
    let per_page = per_page.clamp(1, 100);
    (page, per_page, (page - 1).saturating_mul(per_page))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valores_fora_da_faixa_sao_normalizados() {
        assert_eq!(page_window(0, 0), (1, 1, 0));
        assert_eq!(page_window(-5, 500), (1, 100, 0));
        assert_eq!(page_window(3, 10), (3, 10, 20));
    }

    #[test]
    fn pagina_no_limite_do_i64_satura_o_deslocamento() {
        let (page, per_page, offset) = page_window(i64::MAX, 100);
        assert_eq!(page, i64::MAX);
        assert_eq!(per_page, 100);
        assert_eq!(offset, i64::MAX);
    }
}
