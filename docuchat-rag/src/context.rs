//! Context assembly and prompt construction
//!
//! Turns the final ranked chunk list into a single prompt context with
//! bracketed source references, framed according to the classified query
//! type.

use crate::classifier::QueryType;
use crate::types::{SearchResult, SourceReference};

/// Context statement used when retrieval produced no chunks.
///
/// The pipeline still calls the language model with this negative context
/// so the model can answer "no information available" itself.
pub const NO_CONTEXT_STATEMENT: &str =
    "Aucune information pertinente n'a été trouvée dans les documents indexés.";

/// System prompt framing the assistant's role
pub const SYSTEM_PROMPT: &str = "Tu es un assistant IA spécialisé dans la génération de réponses \
précises basées sur le contexte fourni. Utilise les informations suivantes pour répondre à la \
question de l'utilisateur. Si la réponse ne peut pas être déterminée à partir du contexte, \
indique-le clairement.";

/// Per-category French preamble introducing the retrieved passages
fn preamble(query_type: QueryType) -> &'static str {
    match query_type {
        QueryType::Factual | QueryType::General => {
            "Voici des extraits de documents contenant des informations factuelles pour répondre à la question :"
        }
        QueryType::Procedural => {
            "Voici des extraits de documents décrivant les étapes et instructions pertinentes :"
        }
        QueryType::Comparative => {
            "Voici des extraits de documents permettant de comparer les éléments mentionnés :"
        }
        QueryType::Conceptual => {
            "Voici des extraits de documents expliquant les concepts concernés :"
        }
    }
}

/// Assembled context: the prompt text plus the parallel source references
#[derive(Debug, Clone)]
pub struct AssembledContext {
    pub text: String,
    pub sources: Vec<SourceReference>,
}

/// Build the prompt context and source references from the ranked chunks.
///
/// Each chunk is prefixed with a bracketed numeric reference `[n]` in rank
/// order; the references list is built in the same order. An empty chunk
/// list yields the explicit "no relevant information" statement and an
/// empty references list.
pub fn assemble_context(results: &[SearchResult], query_type: QueryType) -> AssembledContext {
    if results.is_empty() {
        return AssembledContext {
            text: NO_CONTEXT_STATEMENT.to_string(),
            sources: Vec::new(),
        };
    }

    let mut parts = vec![preamble(query_type).to_string()];
    let mut sources = Vec::with_capacity(results.len());

    for (i, result) in results.iter().enumerate() {
        let reference = format!("[{}]", i + 1);
        parts.push(format!("{} {}", reference, result.chunk.content));

        let metadata = &result.chunk.metadata;
        sources.push(SourceReference {
            reference,
            title: metadata
                .title
                .clone()
                .unwrap_or_else(|| "Document sans titre".to_string()),
            source: metadata
                .source_type
                .clone()
                .unwrap_or_else(|| "inconnu".to_string()),
            date: metadata.date,
        });
    }

    AssembledContext {
        text: parts.join("\n\n"),
        sources,
    }
}

/// Build the final user prompt embedding the context, the raw query and the
/// classified query type.
pub fn build_prompt(context: &str, query: &str, query_type: QueryType) -> String {
    format!(
        "CONTEXTE :\n{context}\n\n\
        QUESTION ({query_type}) :\n{query}\n\n\
        INSTRUCTIONS :\n\
        - Réponds d'abord à partir du contexte fourni.\n\
        - Si le contexte est insuffisant pour répondre, indique-le explicitement.\n\
        - Cite les références entre crochets (par exemple [1]) lorsque tu utilises une information précise.",
        context = context,
        query = query,
        query_type = query_type.label(),
    )
}
