/// Embedded single-page frontend for the code map

pub const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Codemap - Codebase Structure</title>
    <script src="https://d3js.org/d3.v7.min.js"></script>
    <style>
        * {
            margin: 0;
            padding: 0;
            box-sizing: border-box;
        }

        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, Oxygen, Ubuntu, sans-serif;
            background: #fafafa;
            color: #222;
        }

        #container {
            display: flex;
            height: 100vh;
        }

        #main {
            flex: 1;
            display: flex;
            flex-direction: column;
            overflow: hidden;
        }

        #toolbar {
            display: flex;
            align-items: center;
            gap: 8px;
            padding: 10px 16px;
            border-bottom: 1px solid #ddd;
            background: #fff;
        }

        #toolbar button {
            padding: 6px 14px;
            border: 1px solid #ccc;
            border-radius: 4px;
            background: #f4f4f4;
            cursor: pointer;
        }

        #toolbar button.active {
            background: #2196F3;
            border-color: #2196F3;
            color: #fff;
        }

        #view-select {
            display: none;
            padding: 5px;
        }

        #toolbar label {
            margin-left: auto;
            font-size: 0.9em;
        }

        #chart {
            flex: 1;
            overflow: auto;
        }

        #sidebar {
            width: 360px;
            background: #fff;
            border-left: 1px solid #ddd;
            padding: 20px;
            overflow-y: auto;
        }

        h1 {
            font-size: 1.4em;
            margin-bottom: 10px;
        }

        h2 {
            font-size: 1.1em;
            margin: 15px 0 10px;
            color: #666;
        }

        .legend {
            display: flex;
            flex-wrap: wrap;
            gap: 10px;
        }

        .legend-item {
            display: flex;
            align-items: center;
            gap: 5px;
            font-size: 0.85em;
        }

        .legend-color {
            width: 12px;
            height: 12px;
            border-radius: 50%;
        }

        .fact {
            display: flex;
            justify-content: space-between;
            padding: 5px 0;
            border-bottom: 1px solid #eee;
            font-size: 0.9em;
        }

        .collapsible-section {
            margin-top: 10px;
        }

        .collapsible-header {
            cursor: pointer;
            font-weight: bold;
            user-select: none;
        }

        .collapsible-content {
            padding: 6px 0 0 14px;
            font-size: 0.9em;
        }

        .collapsible-content pre {
            background: #f4f4f4;
            padding: 8px;
            overflow-x: auto;
            font-size: 0.85em;
        }

        .message {
            color: #888;
            font-style: italic;
            margin-top: 10px;
        }

        .node {
            cursor: pointer;
        }

        .node circle {
            stroke: #555;
            stroke-width: 1.5px;
        }

        .node text {
            font-size: 10px;
        }

        .link {
            fill: none;
            stroke: #ccc;
            stroke-width: 1.5px;
        }
    </style>
</head>
<body>
    <div id="container">
        <div id="main">
            <div id="toolbar">
                <button data-renderer="tree" class="active">Tree</button>
                <button data-renderer="treemap">Treemap</button>
                <button data-renderer="arc">Arc Diagram</button>
                <select id="view-select">
                    <option value="hierarchy">Hierarchy</option>
                    <option value="dependency">Dependencies</option>
                    <option value="input">Inputs</option>
                    <option value="output">Outputs</option>
                </select>
                <label>
                    <input type="checkbox" id="include-source">
                    Include source
                </label>
            </div>
            <div id="chart"></div>
        </div>
        <div id="sidebar">
            <h1>Codemap</h1>
            <h2>Legend</h2>
            <div class="legend" id="legend"></div>
            <h2>Details</h2>
            <div id="details">
                <div class="message">No details available for this node.</div>
            </div>
        </div>
    </div>

    <script>
        const categoryColors = {
            'directory': '#8BC34A',
            'c': '#2196F3',
            'h': '#FF9800',
            'makefile': '#9C27B0',
            'other': '#9E9E9E'
        };

        const width = 960;
        const height = 600;
        const margin = { top: 20, right: 20, bottom: 20, left: 40 };
        const duration = 750;

        let data = null;
        let renderer = 'tree';

        function category(id) {
            const dot = id.lastIndexOf('.');
            if (dot < 0) return 'directory';
            const ext = id.slice(dot + 1).toLowerCase();
            return ext === 'c' || ext === 'h' ? ext : 'other';
        }

        function nodeColor(d) {
            const node = d.data || d;
            if (node.type === 'directory') return categoryColors.directory;
            if (node.type === 'file') {
                const name = node.name.toLowerCase();
                if (name === 'makefile') return categoryColors.makefile;
                if (!name.includes('.')) return categoryColors.other;
            }
            return categoryColors[category(node.name || node.id)];
        }

        function includeSource() {
            return document.getElementById('include-source').checked;
        }

        async function init() {
            const legend = d3.select('#legend');
            for (const [name, color] of Object.entries(categoryColors)) {
                const item = legend.append('div').attr('class', 'legend-item');
                item.append('div').attr('class', 'legend-color').style('background', color);
                item.append('span').text(name);
            }

            document.querySelectorAll('#toolbar button').forEach(button => {
                button.addEventListener('click', () => {
                    renderer = button.dataset.renderer;
                    document.querySelectorAll('#toolbar button')
                        .forEach(b => b.classList.toggle('active', b === button));
                    draw();
                });
            });
            document.getElementById('view-select').addEventListener('change', draw);
            document.getElementById('include-source').addEventListener('change', reload);

            await reload();
        }

        async function reload() {
            try {
                const response = await fetch(`/api/codebase?includeSource=${includeSource()}`);
                data = await response.json();
                numberNodes(data);
            } catch (e) {
                console.error('Error loading codebase structure:', e);
                return;
            }
            draw();
        }

        function draw() {
            d3.select('#chart').selectAll('*').remove();
            document.getElementById('view-select').style.display =
                renderer === 'arc' ? 'inline-block' : 'none';
            if (!data) return;
            if (renderer === 'tree') drawTree();
            else if (renderer === 'treemap') drawTreemap();
            else drawArc();
        }

        // Pre-order position, matching the server's node ids.
        function numberNodes(root) {
            let next = 0;
            (function visit(node) {
                node._preorder = next++;
                (node.children || []).forEach(visit);
            })(root);
        }

        function showNode(d) {
            showDetails(`id=${d.data._preorder}`);
        }

        function showReference(id) {
            showDetails(`name=${encodeURIComponent(id)}`);
        }

        async function showDetails(selector) {
            const details = d3.select('#details');
            details.selectAll('*').remove();
            const response = await fetch(
                `/api/details?${selector}&includeSource=${includeSource()}`);
            const panel = await response.json();

            if (panel.title) details.append('h3').text(panel.title);
            for (const fact of panel.facts) {
                const row = details.append('div').attr('class', 'fact');
                row.append('span').text(fact.label);
                row.append('span').text(fact.value);
            }
            for (const section of panel.sections) {
                const wrap = details.append('div').attr('class', 'collapsible-section');
                const header = wrap.append('div').attr('class', 'collapsible-header');
                const content = wrap.append('div')
                    .attr('class', 'collapsible-content')
                    .style('display', section.expanded ? 'block' : 'none');
                const label = () =>
                    `${content.style('display') === 'none' ? '▶' : '▼'} ${section.title}`;
                header.text(label());
                header.on('click', () => {
                    const hidden = content.style('display') === 'none';
                    content.style('display', hidden ? 'block' : 'none');
                    header.text(label());
                });

                const body = section.body;
                if (body.kind === 'list') {
                    const list = content.append('ul');
                    body.value.forEach(item => list.append('li').text(item));
                } else if (body.kind === 'code') {
                    content.append('pre').append('code').text(body.value);
                } else {
                    content.append('p').text(body.value);
                }
            }
            if (panel.message) {
                details.append('div').attr('class', 'message').text(panel.message);
            }
        }

        function drawTree() {
            const innerWidth = width - margin.left - margin.right;
            const innerHeight = height * 2 - margin.top - margin.bottom;

            const svg = d3.select('#chart').append('svg')
                .attr('width', innerWidth * 1.25 + margin.left + margin.right + 200)
                .attr('height', innerHeight * 1.5 + margin.top + margin.bottom);
            const g = svg.append('g')
                .attr('transform', `translate(${margin.left},${margin.top})`);

            const root = d3.hierarchy(data, d => d.children);
            const levels = root.height;
            root.x0 = innerHeight * 1.5 / 2;
            root.y0 = 0;
            root.descendants().forEach((d, i) => {
                d.id = i;
                d._children = d.children;
                if (d.depth > 0) d.children = null;
            });

            const tree = d3.tree().size([innerHeight * 1.5, innerWidth * 1.25]);
            update(root);

            function update(source) {
                tree(root);
                const nodes = root.descendants();
                const links = root.links();
                nodes.forEach(d => { d.y = d.depth * innerWidth * 1.25 / (levels + 1); });

                const node = g.selectAll('g.node').data(nodes, d => d.id);
                const nodeEnter = node.enter().append('g')
                    .attr('class', 'node')
                    .attr('transform', () => `translate(${source.y0},${source.x0})`)
                    .on('click', (event, d) => {
                        if (d.children) {
                            d.children = null;
                        } else if (d._children) {
                            d.children = d._children;
                        }
                        update(d);
                        showNode(d);
                    });
                nodeEnter.append('circle').attr('r', 7).attr('fill', nodeColor);
                nodeEnter.append('text')
                    .attr('dy', '0.31em')
                    .attr('x', d => d._children ? -10 : 10)
                    .attr('text-anchor', d => d._children ? 'end' : 'start')
                    .text(d => d.data.name);

                node.merge(nodeEnter).transition().duration(duration)
                    .attr('transform', d => `translate(${d.y},${d.x})`);
                node.exit().transition().duration(duration)
                    .attr('transform', () => `translate(${source.y},${source.x})`)
                    .remove();

                const diagonal = d3.linkHorizontal().x(d => d.y).y(d => d.x);
                const link = g.selectAll('path.link').data(links, d => d.target.id);
                const linkEnter = link.enter().insert('path', 'g')
                    .attr('class', 'link')
                    .attr('d', () => {
                        const o = { x: source.x0, y: source.y0 };
                        return diagonal({ source: o, target: o });
                    });
                link.merge(linkEnter).transition().duration(duration).attr('d', diagonal);
                link.exit().transition().duration(duration)
                    .attr('d', () => {
                        const o = { x: source.x, y: source.y };
                        return diagonal({ source: o, target: o });
                    })
                    .remove();

                nodes.forEach(d => { d.x0 = d.x; d.y0 = d.y; });
            }
        }

        function drawTreemap() {
            const innerWidth = width * 1.5 - margin.left - margin.right;
            const innerHeight = height * 2 - margin.top - margin.bottom;

            const root = d3.hierarchy(data)
                .sum(d => d.type === 'file' ? (d.size || 0) : 0)
                .sort((a, b) => b.value - a.value);
            d3.treemap()
                .size([innerWidth, innerHeight])
                .paddingTop(50)
                .paddingRight(7)
                .paddingInner(3)
                .round(true)(root);

            const svg = d3.select('#chart').append('svg')
                .attr('width', innerWidth + margin.left + margin.right)
                .attr('height', innerHeight + margin.top + margin.bottom + 50);
            const g = svg.append('g')
                .attr('transform', `translate(${margin.left},${margin.top + 50})`);

            const cell = g.selectAll('g').data(root.descendants()).join('g')
                .attr('transform', d => `translate(${d.x0},${d.y0})`)
                .on('click', (event, d) => showNode(d));
            cell.append('rect')
                .attr('width', d => d.x1 - d.x0)
                .attr('height', d => d.y1 - d.y0)
                .attr('fill', nodeColor)
                .attr('stroke', d => d.children ? '#000' : 'none')
                .attr('stroke-width', d => d.children ? 2 : 0);
            cell.append('text')
                .attr('x', 4).attr('y', 14).attr('dy', '.35em')
                .attr('font-size', '10px')
                .text(d => d.data.name)
                .each(function(d) {
                    const room = d.x1 - d.x0 - 8;
                    let text = d.data.name;
                    while (text.length > 0 && this.getComputedTextLength() > room) {
                        text = text.slice(0, -1);
                        this.textContent = text + '...';
                    }
                });
            cell.append('text')
                .attr('x', 4).attr('y', 26).attr('dy', '.35em')
                .attr('font-size', '9px').attr('fill', '#555')
                .text(d => d.value);
            cell.append('title')
                .text(d => `${d.data.name}\nSize: ${d.value}\nType: ${d.data.type}`);
        }

        async function drawArc() {
            const view = document.getElementById('view-select').value;
            const response = await fetch(`/api/links?view=${view}`);
            const graph = await response.json();

            const innerHeight = height * 3 - margin.top - margin.bottom;
            const y = d3.scalePoint()
                .domain(graph.nodes.map(d => d.id))
                .range([0, innerHeight]);

            d3.select('#chart').selectAll('*').remove();
            const svg = d3.select('#chart').append('svg')
                .attr('width', width)
                .attr('height', innerHeight + margin.top + margin.bottom);
            const g = svg.append('g')
                .attr('transform', `translate(${margin.left},${margin.top})`);

            const arc = d => {
                const y1 = y(d.source);
                const y2 = y(d.target);
                const r = Math.abs(y2 - y1) / 2;
                return `M${margin.left},${y1}A${r},${r} 0,0,${y1 < y2 ? 1 : 0} ${margin.left},${y2}`;
            };

            const path = g.append('g')
                .attr('fill', 'none')
                .attr('stroke-width', 1.5)
                .selectAll('path')
                .data(graph.links.filter(d => y(d.source) !== undefined && y(d.target) !== undefined))
                .join('path')
                .attr('stroke', d => categoryColors[category(d.source)])
                .attr('stroke-opacity', 0.6)
                .attr('d', arc);

            const node = g.append('g')
                .attr('font-size', 10)
                .attr('text-anchor', 'end')
                .selectAll('g')
                .data(graph.nodes)
                .join('g')
                .attr('class', 'node')
                .attr('transform', d => `translate(${margin.left},${y(d.id)})`);
            node.append('text')
                .attr('x', -6)
                .attr('dy', '0.35em')
                .attr('fill', d => categoryColors[d.group])
                .text(d => d.id);
            const circle = node.append('circle')
                .attr('r', 3)
                .attr('fill', d => categoryColors[d.group]);

            node.on('mouseover', (event, d) => {
                path.attr('stroke-opacity', e => e.source === d.id || e.target === d.id ? 1.0 : 0.1);
                circle.attr('r', c => c.id === d.id ? 6 : 3);
            })
            .on('mouseout', () => {
                path.attr('stroke-opacity', 0.6);
                circle.attr('r', 3);
            })
            .on('click', (event, d) => showReference(d.id));
        }

        init();
    </script>
</body>
</html>
"#;
