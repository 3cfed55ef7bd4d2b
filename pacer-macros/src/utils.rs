use proc_macro::{Delimiter, Group, Ident, Span, TokenStream, TokenTree};

/// Splits a `TokenStream` into comma-separated arguments.
///
/// Commas nested inside groups belong to the group and are not separators.
pub(crate) fn split_args(input: TokenStream) -> Vec<Vec<TokenTree>> {
    let mut args = Vec::new();
    let mut current = Vec::new();

    for token in input {
        match &token {
            TokenTree::Punct(p) if p.as_char() == ',' => {
                if !current.is_empty() {
                    args.push(current);
                    current = Vec::new();
                }
            }
            _ => current.push(token),
        }
    }

    if !current.is_empty() {
        args.push(current);
    }

    args
}

/// Parses the attribute arguments shared by `main` and `test`.
///
/// The only accepted argument is `worker_threads = N` with `N > 0`.
pub(crate) fn parse_worker_threads(attr: TokenStream) -> Result<Option<usize>, String> {
    let mut worker_threads = None;

    for arg in split_args(attr) {
        match arg.as_slice() {
            [
                TokenTree::Ident(key),
                TokenTree::Punct(eq),
                TokenTree::Literal(value),
            ] if key.to_string() == "worker_threads" && eq.as_char() == '=' => {
                let n = value
                    .to_string()
                    .parse::<usize>()
                    .map_err(|_| format!("`worker_threads` expects an integer, got `{value}`"))?;

                if n == 0 {
                    return Err("`worker_threads` must be > 0".to_string());
                }

                worker_threads = Some(n);
            }
            _ => {
                let arg = arg.iter().map(ToString::to_string).collect::<String>();
                return Err(format!(
                    "unsupported argument `{arg}`, expected `worker_threads = N`"
                ));
            }
        }
    }

    Ok(worker_threads)
}

/// Rewrites `async fn name(..) { body }` into
/// `fn name(..) { <runtime>.block_on(async move { body }) }`.
///
/// Returns `None` if `item` has no body.
pub(crate) fn block_on_body(item: TokenStream, worker_threads: Option<usize>) -> Option<TokenStream> {
    let mut tokens: Vec<TokenTree> = item.into_iter().collect();

    if let Some(pos) = tokens
        .iter()
        .position(|t| matches!(t, TokenTree::Ident(id) if id.to_string() == "async"))
    {
        tokens.remove(pos);
    }

    let pos = tokens
        .iter()
        .rposition(|t| matches!(t, TokenTree::Group(g) if g.delimiter() == Delimiter::Brace))?;

    let TokenTree::Group(body) = tokens[pos].clone() else {
        return None;
    };

    let mut builder = String::from("::pacer::RuntimeBuilder::new()");
    if let Some(n) = worker_threads {
        builder.push_str(&format!(".worker_threads({n})"));
    }

    let prelude: TokenStream = format!(
        "let runtime = {builder}.build().expect(\"failed to start the pacer runtime\"); runtime.block_on"
    )
    .parse()
    .ok()?;

    let mut future = TokenStream::new();
    future.extend([
        TokenTree::Ident(Ident::new("async", Span::call_site())),
        TokenTree::Ident(Ident::new("move", Span::call_site())),
        TokenTree::Group(body.clone()),
    ]);

    let mut new_body = prelude;
    new_body.extend([TokenTree::Group(Group::new(Delimiter::Parenthesis, future))]);

    let mut group = Group::new(Delimiter::Brace, new_body);
    group.set_span(body.span());
    tokens[pos] = TokenTree::Group(group);

    Some(tokens.into_iter().collect())
}

/// Expands to `compile_error!(msg)`.
pub(crate) fn compile_error(msg: &str) -> TokenStream {
    format!("::core::compile_error!({msg:?});")
        .parse()
        .unwrap_or_default()
}
